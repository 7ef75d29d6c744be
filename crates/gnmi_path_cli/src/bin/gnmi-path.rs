use clap::Parser;
use gnmi_path_cli::Opt;

/// Main `gnmi-path` executable entrypoint.
pub fn main() -> anyhow::Result<()> {
    let opt = Opt::parse();
    gnmi_path_trace::init_fmt(opt.structured)?;
    println!("{}", opt.run()?);
    Ok(())
}
