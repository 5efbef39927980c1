use anyhow::Context;
use parse_sensors::{IocLoader, ItoolsLoader, Readings, Source};
use std::path::{Path, PathBuf};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "parse-sensors", about = "Parsing temperature sensors logs")]
struct Opt {
    /// Paths to the log files
    #[structopt(parse(from_os_str))]
    paths: Vec<PathBuf>,
    /// Log files glob pattern, e.g. "data/*/raw/*.csv"
    #[structopt(short, long)]
    glob: Option<String>,
    /// Log format: ioc or itools
    #[structopt(short, long, default_value = "ioc")]
    source: Source,
    /// Keep the iTools column names as variable names
    #[structopt(long)]
    raw_names: bool,
    /// Save the processed readings to CSV file
    #[structopt(long, parse(from_os_str))]
    csv: Option<PathBuf>,
    /// Plot the readings into a SVG file
    #[structopt(short, long, parse(from_os_str))]
    plot: Option<PathBuf>,
    /// Variable left out of the plot
    #[structopt(long)]
    skip: Option<String>,
}

/// Appends the input file stem to the output file name when there are several inputs
fn output(path: &Path, input: &Path, batch: bool) -> PathBuf {
    if !batch {
        return path.to_path_buf();
    }
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    let input_stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let name = match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, input_stem, ext.to_string_lossy()),
        None => format!("{}_{}", stem, input_stem),
    };
    path.with_file_name(name)
}

fn process(opt: &Opt, path: &Path, batch: bool) -> anyhow::Result<()> {
    let readings: Readings = match opt.source {
        Source::Ioc => IocLoader::default().data_path(path).load()?,
        Source::Itools => ItoolsLoader::default()
            .data_path(path)
            .raw_names(opt.raw_names)
            .load()?,
    };
    println!("{}:", path.display());
    readings.summary();

    if let Some(filename) = &opt.csv {
        let filename = output(filename, path, batch);
        readings
            .to_csv(&filename)
            .with_context(|| format!("writing {}", filename.display()))?;
        log::info!("readings saved to {}", filename.display());
    }
    if let Some(filename) = &opt.plot {
        let filename = output(filename, path, batch);
        #[cfg(feature = "plot")]
        {
            readings
                .plot(&filename, opt.skip.as_deref())
                .with_context(|| format!("plotting {}", filename.display()))?;
            log::info!("plot saved to {}", filename.display());
        }
        #[cfg(not(feature = "plot"))]
        log::warn!(
            "{} not written, build with the `plot` feature to enable plotting",
            filename.display()
        );
    }
    Ok(())
}

/// Collects the log files given on the command line and with the glob pattern
fn inputs(opt: &Opt) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = opt.paths.clone();
    if let Some(pattern) = &opt.glob {
        for entry in glob::glob(pattern)? {
            paths.push(entry?);
        }
    }
    if paths.is_empty() {
        anyhow::bail!("no log file given");
    }
    Ok(paths)
}

/// Processes every log file, carrying on after a failure
fn run(opt: &Opt, paths: &[PathBuf]) -> anyhow::Result<()> {
    let batch = paths.len() > 1;
    let mut n_failed = 0;
    for path in paths {
        if let Err(err) = process(opt, path, batch) {
            log::error!("{}: {:?}", path.display(), err);
            n_failed += 1;
        }
    }
    if n_failed > 0 {
        anyhow::bail!("{} of {} log file(s) failed", n_failed, paths.len());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();
    let paths = inputs(&opt)?;
    run(&opt, &paths)
}
