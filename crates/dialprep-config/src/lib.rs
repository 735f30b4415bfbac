use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dialprep_core::record::{FieldProfile, TopSlotColumns};
use dialprep_core::region::Region;
use serde::Deserialize;
use thiserror::Error;

const APP_DIR: &str = "dialprep";
const CONFIG_FILENAME: &str = "config.toml";

pub const DEFAULT_TEXT_PROTECT_PREFIX: char = '\'';
pub const DEFAULT_START_MARKER: &str =
    "Ich rufe Sie an, weil wir bereits sehr erfolgreich ein ähnliches Projekt umgesetzt haben";
pub const DEFAULT_END_MARKER: &str = "Für dieses";
pub const DEFAULT_COUNT_KEYWORD: &str = "Leads";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Prefix applied to phone-bearing output cells so spreadsheet
    /// consumers treat them as text.
    pub text_protect_prefix: char,
    /// Move rows without any resolved number into the removed file
    /// instead of keeping them with empty phone columns.
    pub drop_unreachable: bool,
    pub regions: Vec<Region>,
    pub markers: MarkerConfig,
    pub columns: FieldProfile,
}

#[derive(Debug, Clone)]
pub struct MarkerConfig {
    pub start: String,
    pub end: String,
    pub count_keyword: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            text_protect_prefix: DEFAULT_TEXT_PROTECT_PREFIX,
            drop_unreachable: false,
            regions: Region::all().to_vec(),
            markers: MarkerConfig {
                start: DEFAULT_START_MARKER.to_string(),
                end: DEFAULT_END_MARKER.to_string(),
                count_keyword: DEFAULT_COUNT_KEYWORD.to_string(),
            },
            columns: FieldProfile::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("text_protect_prefix must be a single character: {0:?}")]
    InvalidTextProtectPrefix(String),
    #[error("unknown region: {0:?} (expected DE, AT, or CH)")]
    UnknownRegion(String),
    #[error("regions must not be empty")]
    EmptyRegions,
    #[error("marker value must not be empty: {0}")]
    EmptyMarker(&'static str),
    #[error("column name must not be empty: {0}")]
    EmptyColumn(&'static str),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    text_protect_prefix: Option<String>,
    drop_unreachable: Option<bool>,
    regions: Option<Vec<String>>,
    markers: Option<MarkersFile>,
    columns: Option<ColumnsFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MarkersFile {
    start: Option<String>,
    end: Option<String>,
    count_keyword: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ColumnsFile {
    company: Option<String>,
    canonical_url: Option<String>,
    fallback_url: Option<String>,
    top: Option<Vec<TopSlotFile>>,
    main_office_number: Option<String>,
    main_office_type: Option<String>,
    main_office_source_url: Option<String>,
    input_fallback_number: Option<String>,
    exclusion_list: Option<String>,
    pitch: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TopSlotFile {
    number: String,
    #[serde(rename = "type")]
    type_label: Option<String>,
    source_url: Option<String>,
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(prefix) = parsed.text_protect_prefix {
        let mut chars = prefix.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => config.text_protect_prefix = ch,
            _ => return Err(ConfigError::InvalidTextProtectPrefix(prefix)),
        }
    }

    if let Some(drop_unreachable) = parsed.drop_unreachable {
        config.drop_unreachable = drop_unreachable;
    }

    if let Some(regions) = parsed.regions {
        if regions.is_empty() {
            return Err(ConfigError::EmptyRegions);
        }
        let mut active = Vec::new();
        for name in regions {
            let region =
                Region::parse(&name).ok_or_else(|| ConfigError::UnknownRegion(name.clone()))?;
            if !active.contains(&region) {
                active.push(region);
            }
        }
        config.regions = active;
    }

    if let Some(markers) = parsed.markers {
        if let Some(start) = markers.start {
            config.markers.start = required_value(start, "markers.start")?;
        }
        if let Some(end) = markers.end {
            config.markers.end = required_value(end, "markers.end")?;
        }
        if let Some(keyword) = markers.count_keyword {
            config.markers.count_keyword = required_value(keyword, "markers.count_keyword")?;
        }
    }

    if let Some(columns) = parsed.columns {
        merge_columns(&mut config.columns, columns)?;
    }

    Ok(config)
}

fn merge_columns(profile: &mut FieldProfile, parsed: ColumnsFile) -> Result<()> {
    if let Some(company) = parsed.company {
        profile.company = required_column(company, "columns.company")?;
    }
    if let Some(url) = parsed.canonical_url {
        profile.canonical_url = url;
    }
    if let Some(url) = parsed.fallback_url {
        profile.fallback_url = url;
    }
    if let Some(top) = parsed.top {
        profile.tops = top
            .into_iter()
            .map(|slot| {
                Ok(TopSlotColumns {
                    number: required_column(slot.number, "columns.top.number")?,
                    type_label: slot.type_label.unwrap_or_default(),
                    source_url: slot.source_url.unwrap_or_default(),
                })
            })
            .collect::<Result<_>>()?;
    }
    if let Some(name) = parsed.main_office_number {
        profile.main_office_number = name;
    }
    if let Some(name) = parsed.main_office_type {
        profile.main_office_type = name;
    }
    if let Some(name) = parsed.main_office_source_url {
        profile.main_office_source_url = name;
    }
    if let Some(name) = parsed.input_fallback_number {
        profile.input_fallback_number = name;
    }
    if let Some(name) = parsed.exclusion_list {
        profile.exclusion_list = name;
    }
    if let Some(name) = parsed.pitch {
        profile.pitch = name;
    }
    Ok(())
}

fn required_value(value: String, field: &'static str) -> Result<String> {
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyMarker(field));
    }
    Ok(value)
}

fn required_column(value: String, field: &'static str) -> Result<String> {
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyColumn(field));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::{load_at_path, merge_config, ConfigFile};
    use dialprep_core::region::Region;
    use std::fs;
    use tempfile::TempDir;

    fn parse(contents: &str) -> ConfigFile {
        toml::from_str(contents).expect("parse config")
    }

    #[test]
    fn merge_config_applies_values() {
        let parsed = parse(
            r#"
            text_protect_prefix = "`"
            drop_unreachable = true
            regions = ["DE", "CH"]

            [markers]
            start = "Projekt umgesetzt haben"
            end = "Für dieses"
            count_keyword = "Leads"

            [columns]
            company = "Firma"

            [[columns.top]]
            number = "Nummer_1"
            type = "Typ_1"

            [[columns.top]]
            number = "Nummer_2"
            "#,
        );
        let merged = merge_config(parsed).expect("merge");
        assert_eq!(merged.text_protect_prefix, '`');
        assert!(merged.drop_unreachable);
        assert_eq!(merged.regions, vec![Region::De, Region::Ch]);
        assert_eq!(merged.markers.start, "Projekt umgesetzt haben");
        assert_eq!(merged.columns.company, "Firma");
        assert_eq!(merged.columns.tops.len(), 2);
        assert_eq!(merged.columns.tops[0].number, "Nummer_1");
        assert_eq!(merged.columns.tops[0].type_label, "Typ_1");
        assert_eq!(merged.columns.tops[1].type_label, "");
    }

    #[test]
    fn merge_config_keeps_defaults_for_missing_sections() {
        let merged = merge_config(parse("")).expect("merge");
        assert_eq!(merged.text_protect_prefix, '\'');
        assert_eq!(merged.regions, Region::all().to_vec());
        assert_eq!(merged.columns.company, "CompanyName");
        assert_eq!(merged.columns.tops.len(), 3);
    }

    #[test]
    fn merge_config_rejects_unknown_region() {
        let err = merge_config(parse(r#"regions = ["DE", "FR"]"#)).unwrap_err();
        assert!(err.to_string().contains("unknown region"));
    }

    #[test]
    fn merge_config_rejects_empty_regions() {
        assert!(merge_config(parse("regions = []")).is_err());
    }

    #[test]
    fn merge_config_rejects_multi_char_prefix() {
        let err = merge_config(parse(r#"text_protect_prefix = "''""#)).unwrap_err();
        assert!(err.to_string().contains("single character"));
    }

    #[test]
    fn load_at_path_requires_file_when_requested() {
        let temp = TempDir::new().expect("tempdir");
        let missing = temp.path().join("config.toml");
        let err = load_at_path(&missing, true).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn load_at_path_parses_toml() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "drop_unreachable = true\n[columns]\npitch = \"Sales_Pitch\"\n")
            .expect("write config");

        let config = load_at_path(&path, true).expect("load").expect("config");
        assert!(config.drop_unreachable);
        assert_eq!(config.columns.pitch, "Sales_Pitch");
    }
}
