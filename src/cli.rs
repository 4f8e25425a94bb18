use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "batchzip")]
#[command(version)]
#[command(about = "Batch unzip utility driven by a CSV manifest", long_about = None)]
#[command(after_help = "Examples:\n  \
  batchzip -d ./zips -c zips.csv        extract every archive listed in zips.csv\n  \
  batchzip -d ./zips -c zips.csv -j 8   same, at most 8 archives at a time\n  \
  batchzip -f data.zip -p secret        extract one encrypted archive")]
pub struct Cli {
    /// Directory containing the zip files to extract
    #[arg(short = 'd', long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// CSV manifest mapping zip filenames to passwords; required with --dir
    #[arg(short = 'c', long, value_name = "FILE")]
    pub csv: Option<PathBuf>,

    /// Maximum number of archives extracted at once
    #[arg(
        short = 'j',
        long,
        value_name = "N",
        default_value_t = 4,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub jobs: u64,

    /// Single zip file to extract
    #[arg(short = 'f', long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Password for the single zip file, if encrypted
    #[arg(short = 'p', long, value_name = "PASSWORD")]
    pub password: Option<String>,
}

impl Cli {
    pub fn max_jobs(&self) -> usize {
        self.jobs as usize
    }
}
