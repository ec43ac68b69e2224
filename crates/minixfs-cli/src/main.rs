use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use minixfs_core::format::{describe_inode, describe_partition, describe_superblock, format_listing};
use minixfs_core::{BlockDevice, MinixConfig, MinixSession};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "minixfs", version, about = "Read files and directories from MINIX V1 disk images")]
struct Cli {
	/// Dump partition, superblock and inode details to stderr
	#[arg(short, long, global = true)]
	verbose: bool,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Args, Debug)]
struct PartitionArgs {
	/// Select a primary partition (0-3)
	#[arg(short = 'p', long = "partition")]
	partition: Option<u32>,
	/// Select a subpartition inside the primary partition (0-3)
	#[arg(short = 's', long = "subpartition", requires = "partition")]
	subpartition: Option<u32>,
}

impl PartitionArgs {
	fn config(&self) -> MinixConfig {
		MinixConfig {
			primary_partition: self.partition,
			subpartition: self.subpartition,
		}
	}
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// List a directory, or describe a single file
	Ls {
		/// Path to image file
		image: PathBuf,
		/// Path inside the filesystem (default: root)
		#[arg(default_value = "/")]
		path: String,
		#[command(flatten)]
		partition: PartitionArgs,
		/// Emit the listing as JSON
		#[arg(long)]
		json: bool,
	},
	/// Copy a regular file out of the image
	Get {
		/// Path to image file
		image: PathBuf,
		/// Path of the file inside the filesystem
		src: String,
		/// Destination file (default: stdout)
		dst: Option<PathBuf>,
		#[command(flatten)]
		partition: PartitionArgs,
	},
	/// Show filesystem geometry
	Info {
		/// Path to image file
		image: PathBuf,
		#[command(flatten)]
		partition: PartitionArgs,
	},
	/// Check whether an image holds a MINIX filesystem
	Detect {
		/// Path to image file
		image: PathBuf,
		#[command(flatten)]
		partition: PartitionArgs,
	},
}

fn open(image: &PathBuf, partition: &PartitionArgs, verbose: bool) -> Result<MinixSession<BlockDevice>> {
	let session = MinixSession::open_path(image, &partition.config())
		.with_context(|| format!("failed to open {}", image.display()))?;

	if verbose {
		let location = session.partition();
		if let Some(entry) = &location.primary {
			eprintln!("Partition {}:", partition.partition.unwrap_or_default());
			eprint!("{}", describe_partition(entry));
		}
		if let Some(entry) = &location.subpartition {
			eprintln!("Subpartition {}:", partition.subpartition.unwrap_or_default());
			eprint!("{}", describe_partition(entry));
		}
		eprintln!("{}", describe_superblock(session.superblock()));
	}

	Ok(session)
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	// Logs go to stderr so file content on stdout stays clean
	tracing_subscriber::fmt()
		.with_writer(std::io::stderr)
		.with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
		.init();

	match cli.command {
		Commands::Ls { image, path, partition, json } => {
			let mut session = open(&image, &partition, cli.verbose)?;

			if cli.verbose {
				let target = session.resolve(&path)?;
				eprintln!("{}", describe_inode(&target.inode));
			}

			let listing = session.list(&path)?;
			if json {
				println!("{}", serde_json::to_string_pretty(&listing)?);
			} else {
				print!("{}", format_listing(&listing));
			}
		}
		Commands::Get { image, src, dst, partition } => {
			let mut session = open(&image, &partition, cli.verbose)?;

			if cli.verbose {
				let target = session.resolve(&src)?;
				eprintln!("{}", describe_inode(&target.inode));
			}

			let data = session.read_path(&src)?;
			match dst {
				Some(dst) => {
					let mut output = File::create(&dst)
						.with_context(|| format!("failed to create {}", dst.display()))?;
					output.write_all(&data)?;
					output.flush()?;
				}
				None => {
					let mut stdout = std::io::stdout().lock();
					stdout.write_all(&data)?;
					stdout.flush()?;
				}
			}
		}
		Commands::Info { image, partition } => {
			let info = minixfs_core::fs::get_filesystem_info(&image, &partition.config())?;
			println!("{}", info);
		}
		Commands::Detect { image, partition } => {
			if minixfs_core::fs::detect_filesystem(&image, &partition.config())? {
				println!("MINIX V1 filesystem detected in {}", image.display());
			} else {
				println!("No MINIX filesystem found in {}", image.display());
				std::process::exit(1);
			}
		}
	}
	Ok(())
}
