//! Connection parameters read from one section of an INI file.

use std::collections::BTreeMap;
use std::path::Path;

use config::{Config, ConfigError, File, FileFormat};
use sqlx::mysql::MySqlConnectOptions;

use crate::error::DbError;

/// Keys understood when building connect options; anything else is ignored.
const KNOWN_KEYS: &[&str] = &["host", "port", "user", "password", "database", "socket", "charset"];

/// Flat `name -> value` mapping taken verbatim from a config section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionParams {
    values: BTreeMap<String, String>,
}

impl ConnectionParams {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build MySQL connect options, leaving unset keys at the driver defaults.
    pub fn connect_options(&self) -> Result<MySqlConnectOptions, DbError> {
        let mut options = MySqlConnectOptions::new();

        for (key, value) in self.iter() {
            options = match key {
                "host" => options.host(value),
                "port" => options.port(value.parse().map_err(|_| DbError::InvalidParameter {
                    key: key.to_string(),
                    value: value.to_string(),
                })?),
                "user" => options.username(value),
                "password" => options.password(value),
                "database" => options.database(value),
                "socket" => options.socket(value),
                "charset" => options.charset(value),
                _ => {
                    tracing::warn!(key, "ignoring unsupported connection parameter");
                    options
                }
            };
        }

        Ok(options)
    }
}

impl FromIterator<(String, String)> for ConnectionParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect(),
        }
    }
}

/// Read `section` of the INI file at `config_path`.
///
/// A missing file reads as an empty one, so both cases end in
/// [`DbError::Configuration`] naming the section and the file.
pub fn load_connection_params(config_path: &Path, section: &str) -> Result<ConnectionParams, DbError> {
    let source_error = |source: ConfigError| DbError::ConfigSource {
        file: config_path.to_path_buf(),
        source,
    };

    let cfg = Config::builder()
        .add_source(File::new(&config_path.to_string_lossy(), FileFormat::Ini).required(false))
        .build()
        .map_err(source_error)?;

    let table = match cfg.get_table(section) {
        Ok(table) => table,
        Err(ConfigError::NotFound(_)) => {
            return Err(DbError::Configuration {
                section: section.to_string(),
                file: config_path.to_path_buf(),
            })
        }
        Err(e) => return Err(source_error(e)),
    };

    let mut values = Vec::with_capacity(table.len());
    for (key, value) in table {
        values.push((key, value.into_string().map_err(source_error)?));
    }
    let params: ConnectionParams = values.into_iter().collect();

    let unknown: Vec<&str> = params
        .iter()
        .map(|(k, _)| k)
        .filter(|k| !KNOWN_KEYS.contains(k))
        .collect();
    tracing::debug!(
        file = %config_path.display(),
        section,
        keys = params.len(),
        ?unknown,
        "connection parameters loaded"
    );

    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_ini(contents: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.ini"), contents).unwrap();
        dir
    }

    #[test]
    fn reads_every_key_of_the_section() {
        let dir = write_ini(
            "[mysql]\nhost = localhost\nuser = root\npassword = root\n\n[other]\nhost = elsewhere\n",
        );

        let params = load_connection_params(&dir.path().join("config.ini"), "mysql").unwrap();

        assert_eq!(
            params.iter().collect::<Vec<_>>(),
            vec![("host", "localhost"), ("password", "root"), ("user", "root")]
        );
    }

    #[test]
    fn missing_section_names_section_and_file() {
        let dir = write_ini("[postgres]\nhost = localhost\n");
        let path = dir.path().join("config.ini");

        let err = load_connection_params(&path, "mysql").unwrap_err();

        assert!(matches!(err, DbError::Configuration { ref section, .. } if section == "mysql"));
        assert_eq!(
            err.to_string(),
            format!("mysql not found in the {} file", path.display())
        );
    }

    #[test]
    fn missing_file_reads_as_missing_section() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_connection_params(&dir.path().join("absent.ini"), "mysql").unwrap_err();
        assert!(matches!(err, DbError::Configuration { .. }));
    }

    #[test]
    fn connect_options_carry_known_keys() {
        let params: ConnectionParams = [
            ("host", "db.internal"),
            ("port", "3307"),
            ("user", "reader"),
            ("database", "ecco_tcp"),
            ("pool_size", "4"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let options = params.connect_options().unwrap();

        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 3307);
        assert_eq!(options.get_username(), "reader");
        assert_eq!(options.get_database(), Some("ecco_tcp"));
    }

    #[test]
    fn non_numeric_port_is_rejected() {
        let params: ConnectionParams = [("port".to_string(), "mysql".to_string())]
            .into_iter()
            .collect();

        let err = params.connect_options().unwrap_err();

        assert!(matches!(err, DbError::InvalidParameter { ref key, .. } if key == "port"));
    }

    #[test]
    fn keys_are_lower_cased() {
        let params: ConnectionParams = [("Host".to_string(), "x".to_string())]
            .into_iter()
            .collect();
        assert_eq!(params.get("host"), Some("x"));
    }
}
