use crate::error::{Result, VamaError};
use crate::template::VariantChoice;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Every section and field may be left out; missing ones take their defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub extractor: ExtractorConfig,
    pub output: OutputConfig,
    pub template: TemplateConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Executable that turns a folder of PDFs into a JSON array
    pub program: PathBuf,
    /// Arguments placed before the folder path
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub file_name: String,
    /// Write through a temporary file and rename it into place
    pub atomic_write: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TemplateConfig {
    pub variant: VariantChoice,
    pub currency: String,
    pub unit: String,
    pub series_label: String,
    pub default_vat_rate: String,
    /// Applied to the advance payment total
    pub commission_rate: String,
    pub default_location_tag: String,
    pub prices: PriceConfig,
    pub consignee_overrides: Vec<ConsigneeOverride>,
    pub location_rewrites: Vec<LocationRewrite>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PriceConfig {
    pub primary: String,
    pub transit: String,
    pub additional_hs_code: String,
    pub physical_control: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConsigneeOverride {
    pub tax_id: String,
    pub primary_price: String,
    pub vat_rate: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LocationRewrite {
    pub prefix: String,
    pub tag: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("pdf-extractor"),
            args: Vec::new(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_name: "output.csv".to_string(),
            atomic_write: true,
        }
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            variant: VariantChoice::Auto,
            currency: "eur".to_string(),
            unit: "BUC".to_string(),
            series_label: "nu e cazul".to_string(),
            default_vat_rate: "0".to_string(),
            commission_rate: "0.025".to_string(),
            default_location_tag: "CT".to_string(),
            prices: PriceConfig::default(),
            consignee_overrides: Vec::new(),
            location_rewrites: Vec::new(),
        }
    }
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            primary: "50".to_string(),
            transit: "75".to_string(),
            additional_hs_code: "5".to_string(),
            physical_control: "22".to_string(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(VamaError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| VamaError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| VamaError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["vama.toml", "vama.config.toml", ".vama.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        tracing::debug!(path = %default_path, "Loading configuration");
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref program) = cli_args.extractor {
            self.extractor.program = program.clone();
        }

        if let Some(variant) = cli_args.variant {
            self.template.variant = variant;
        }

        if let Some(ref file_name) = cli_args.output_name {
            self.output.file_name = file_name.clone();
        }

        if let Some(atomic) = cli_args.atomic_write {
            self.output.atomic_write = atomic;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| VamaError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| VamaError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.extractor.program.as_os_str().is_empty() {
            return Err(VamaError::Config {
                message: "Extractor program must be specified".to_string(),
            });
        }

        let file_name = self.output.file_name.trim();
        if file_name.is_empty() || file_name.contains('/') || file_name.contains('\\') {
            return Err(VamaError::Config {
                message: format!(
                    "Output file name must be a plain file name, got '{}'",
                    self.output.file_name
                ),
            });
        }

        let amounts = [
            ("prices.primary", &self.template.prices.primary),
            ("prices.transit", &self.template.prices.transit),
            ("prices.additional_hs_code", &self.template.prices.additional_hs_code),
            ("prices.physical_control", &self.template.prices.physical_control),
            ("commission_rate", &self.template.commission_rate),
        ];
        for (name, value) in amounts {
            if crate::parser::parse_amount(value).is_err() {
                return Err(VamaError::Config {
                    message: format!("template.{} is not a number: '{}'", name, value),
                });
            }
        }

        for rewrite in &self.template.location_rewrites {
            if rewrite.prefix.is_empty() {
                return Err(VamaError::Config {
                    message: format!("Location rewrite for tag '{}' has an empty prefix", rewrite.tag),
                });
            }
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub extractor: Option<PathBuf>,
    pub variant: Option<VariantChoice>,
    pub output_name: Option<String>,
    pub atomic_write: Option<bool>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extractor(mut self, extractor: Option<PathBuf>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_variant(mut self, variant: Option<VariantChoice>) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_output_name(mut self, output_name: Option<String>) -> Self {
        self.output_name = output_name;
        self
    }

    pub fn with_atomic_write(mut self, atomic: Option<bool>) -> Self {
        self.atomic_write = atomic;
        self
    }
}
