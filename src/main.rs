use clap::Parser;
use std::process;
use vama::{
    detect_variant, init_tracing, scan_folder, Cli, OutputFormatter, OutputMode,
    UserFriendlyError, Vama, VamaError,
};

#[tokio::main]
async fn main() {
    let exit_code = run().await;
    process::exit(exit_code);
}

async fn run() -> i32 {
    // Parse CLI arguments
    let cli = Cli::parse();
    init_tracing(cli.verbosity_level());

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let mut vama = match Vama::from_cli(&cli) {
        Ok(vama) => vama,
        Err(e) => {
            print_startup_error(&e);
            return exit_code_for(&e);
        }
    };

    let folder = match cli.resolve_folder() {
        Ok(folder) => folder,
        Err(e) => {
            vama.handle_error(&e);
            return exit_code_for(&e);
        }
    };

    if cli.dry_run {
        return handle_dry_run(&vama, &folder);
    }

    match vama.process_folder(&folder).await {
        Ok(report) => {
            vama.output_formatter().print_run_report(&report);

            if report.has_skipped() {
                2 // CSV written, some PDFs skipped
            } else {
                0
            }
        }
        Err(e) => {
            vama.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &VamaError) -> i32 {
    match error {
        VamaError::ExtractorFailure { .. } | VamaError::ExtractorLaunch { .. } => 3,
        VamaError::MalformedOutput { .. } => 4,
        VamaError::InvalidPath { .. } => 5,
        VamaError::Csv(_) | VamaError::Io(_) => 6,
        _ => 1,
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "vama.toml".to_string());

    match Vama::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  vama <folder> --config {}", config_path);
            println!("\nEdit the file to set the extractor path, prices and location tags.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(vama: &Vama, folder: &std::path::Path) -> i32 {
    let formatter = vama.output_formatter();

    formatter.info("DRY RUN MODE - the extractor will not be run");
    formatter.print_separator();

    let pdfs = match scan_folder(folder) {
        Ok(pdfs) => pdfs,
        Err(e) => {
            formatter.print_user_friendly_error(&e);
            return exit_code_for(&e);
        }
    };

    let config = vama.config();
    let variant = match config.template.variant.fixed() {
        Some(variant) => variant.to_string(),
        None => format!("{} (detected)", detect_variant(folder, &pdfs)),
    };

    formatter.info("Configuration that would be used:");
    println!("  Extractor: {}", config.extractor.program.display());
    if !config.extractor.args.is_empty() {
        println!("  Extractor args: {}", config.extractor.args.join(" "));
    }
    println!("  Variant: {}", variant);
    println!("  Atomic write: {}", config.output.atomic_write);

    formatter.print_separator();

    formatter.info("Run plan:");
    println!("  Folder: {}", folder.display());
    println!("  PDF files: {}", pdfs.len());
    for pdf in &pdfs {
        formatter.debug(&format!("{} ({} bytes)", pdf.filename, pdf.size));
    }
    println!("  Output file: {}", vama.planned_output_path(folder).display());

    if vama.planned_output_path(folder).exists() {
        formatter.warning("Output file exists and would be overwritten");
    }

    formatter.print_separator();
    formatter.success("Dry run completed successfully");

    0
}

fn print_startup_error(error: &VamaError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use vama::Config;

    #[test]
    fn test_generate_config_command() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");
        let config_arg = config_path.to_string_lossy().to_string();

        let cli = Cli::try_parse_from(["vama", "--generate-config", "--config", &config_arg]).unwrap();

        let exit_code = handle_generate_config(&cli);
        assert_eq!(exit_code, 0);

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[extractor]"));
        assert!(Config::load_from_file(&config_path).is_ok());
    }

    #[test]
    fn test_dry_run_mode() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.pdf"), b"%PDF").unwrap();
        let vama = Vama::new(Config::default(), OutputMode::Plain, 0, true);

        assert_eq!(handle_dry_run(&vama, temp_dir.path()), 0);
        assert!(!temp_dir.path().join("output.csv").exists());
    }

    #[test]
    fn test_dry_run_missing_folder() {
        let temp_dir = TempDir::new().unwrap();
        let vama = Vama::new(Config::default(), OutputMode::Plain, 0, true);

        assert_eq!(handle_dry_run(&vama, &temp_dir.path().join("gone")), 5);
    }

    #[test]
    fn test_exit_codes() {
        let failure = VamaError::ExtractorFailure {
            exit_code: Some(1),
            output: "boom".to_string(),
        };
        assert_eq!(exit_code_for(&failure), 3);

        let malformed = VamaError::MalformedOutput {
            reason: "not an array".to_string(),
            output: "{}".to_string(),
        };
        assert_eq!(exit_code_for(&malformed), 4);

        let invalid = VamaError::InvalidPath {
            path: "/nope".to_string(),
        };
        assert_eq!(exit_code_for(&invalid), 5);

        let io = VamaError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert_eq!(exit_code_for(&io), 6);

        let config = VamaError::Config {
            message: "bad".to_string(),
        };
        assert_eq!(exit_code_for(&config), 1);
    }
}
