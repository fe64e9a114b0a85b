//! YAML run configuration: UCSM credentials, output file and tab schema.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use ucsinv_io_xlsx::{
    EnumSheetNameCollisionRule, SpecCellFormat, SpecReportOptions, SpecReportSchema,
};
use ucsinv_ucsm::SpecUcsmConnection;
use ucsinv_ucsm::spec::N_TIMEOUT_SECS_DEFAULT;

/// Config loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("no password given (config `passwd`, --passwd or UCSINV_PASSWD)")]
    MissingPassword,
}

/// Optional overrides for the header/body cell formats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpecFormatsConfig {
    pub header: Option<SpecCellFormat>,
    pub body: Option<SpecCellFormat>,
}

/// Top-level `config.yaml` document.
#[derive(Debug, Clone, Deserialize)]
pub struct SpecConfig {
    /// UCS Manager host.
    pub host: String,
    /// Login user name.
    pub name: String,
    /// Login password; may come from the command line instead.
    #[serde(default)]
    pub passwd: Option<String>,
    /// Output workbook path.
    pub filename: PathBuf,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default = "derive_default_secure")]
    pub secure: bool,
    #[serde(default)]
    pub verify_tls: bool,
    #[serde(default = "derive_default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub sheet_name_rule: EnumSheetNameCollisionRule,
    #[serde(default)]
    pub sanitize_sheet_names: bool,
    #[serde(default)]
    pub formats: SpecFormatsConfig,
    /// Tab name -> {class, columns}, in workbook order.
    pub tabs: SpecReportSchema,
}

fn derive_default_secure() -> bool {
    true
}

fn derive_default_timeout_secs() -> u64 {
    N_TIMEOUT_SECS_DEFAULT
}

impl SpecConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let c_text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&c_text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Report options with configured formats overlaid on the defaults.
    pub fn report_options(&self) -> SpecReportOptions {
        let options = SpecReportOptions::default();
        SpecReportOptions {
            fmt_header: match &self.formats.header {
                Some(patch) => options.fmt_header.merge(patch),
                None => options.fmt_header,
            },
            fmt_body: match &self.formats.body {
                Some(patch) => options.fmt_body.merge(patch),
                None => options.fmt_body,
            },
            rule_name_collision: self.sheet_name_rule,
            if_sanitize_sheet_names: self.sanitize_sheet_names,
        }
    }

    /// Connection settings; `passwd_override` takes precedence over the file.
    pub fn connection(
        &self,
        passwd_override: Option<&str>,
    ) -> Result<SpecUcsmConnection, ConfigError> {
        let password = passwd_override
            .or(self.passwd.as_deref())
            .ok_or(ConfigError::MissingPassword)?;

        Ok(SpecUcsmConnection {
            port: self.port,
            secure: self.secure,
            verify_tls: self.verify_tls,
            timeout_secs: self.timeout_secs,
            ..SpecUcsmConnection::new(&self.host, &self.name, password)
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const C_CONFIG_MINIMAL: &str = r#"
host: 10.0.0.5
name: admin
passwd: secret
filename: ucs.xlsx
tabs:
  Servers:
    class: computeBlade
    columns: [dn, serial, num_of_cpus]
  Chassis:
    class: EquipmentChassis
    columns:
      - dn
      - model
  Adapters:
    class: adaptorUnit
    columns: []
"#;

    #[test]
    fn test_minimal_config_keeps_tab_order_and_defaults() {
        let config = SpecConfig::from_yaml_str(C_CONFIG_MINIMAL).expect("parse");

        assert_eq!(
            config.tabs.keys().collect::<Vec<_>>(),
            vec!["Servers", "Chassis", "Adapters"]
        );
        assert_eq!(config.tabs["Chassis"].class_id, "EquipmentChassis");
        assert_eq!(config.tabs["Servers"].columns, vec!["dn", "serial", "num_of_cpus"]);
        assert!(config.secure);
        assert!(!config.verify_tls);
        assert_eq!(config.timeout_secs, N_TIMEOUT_SECS_DEFAULT);
        assert_eq!(config.report_options(), SpecReportOptions::default());
    }

    #[test]
    fn test_connection_prefers_override_password() {
        let config = SpecConfig::from_yaml_str(C_CONFIG_MINIMAL).expect("parse");

        let connection = config.connection(Some("from-env")).expect("connection");
        assert_eq!(connection.password, "from-env");
        assert_eq!(connection.uri(), "https://10.0.0.5:443/nuova");

        let connection = config.connection(None).expect("connection");
        assert_eq!(connection.password, "secret");
    }

    #[test]
    fn test_missing_password_is_reported() {
        let c_text = C_CONFIG_MINIMAL.replace("passwd: secret\n", "");
        let config = SpecConfig::from_yaml_str(&c_text).expect("parse");
        assert!(matches!(
            config.connection(None),
            Err(ConfigError::MissingPassword)
        ));
    }

    #[test]
    fn test_optional_settings_are_applied() {
        let c_text = format!(
            "{C_CONFIG_MINIMAL}port: 8443\nverify_tls: true\nsheet_name_rule: numbered\nsanitize_sheet_names: true\nformats:\n  header:\n    bg_color: \"#C0C0C0\"\n  body:\n    border: 2\n"
        );
        let config = SpecConfig::from_yaml_str(&c_text).expect("parse");
        let options = config.report_options();

        assert_eq!(options.rule_name_collision, EnumSheetNameCollisionRule::Numbered);
        assert!(options.if_sanitize_sheet_names);
        assert_eq!(options.fmt_header.bold, Some(true));
        assert_eq!(options.fmt_header.bg_color.as_deref(), Some("#C0C0C0"));
        assert_eq!(options.fmt_body.border, Some(2));

        let connection = config.connection(None).expect("connection");
        assert_eq!(connection.uri(), "https://10.0.0.5:8443/nuova");
        assert!(connection.verify_tls);
    }

    #[test]
    fn test_tab_without_class_is_rejected() {
        let c_text = "host: h\nname: n\nfilename: f.xlsx\ntabs:\n  Servers:\n    columns: [dn]\n";
        assert!(matches!(
            SpecConfig::from_yaml_str(c_text),
            Err(ConfigError::Parse(_))
        ));
    }
}
