//! CIPSI run configuration, deserializable from JSON, YAML or TOML through
//! the same three `serde_*` crates the `cipsi` binary uses for its own
//! input/output formats.

use serde::{
    Deserialize,
    Serialize,
};

/// Davidson eigensolver tunables (§4.7).
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DavidsonParams {
    pub n_eig: usize,
    pub eps_conv: f64,
    pub eps_sub: f64,
    pub max_iter: usize,
    pub m_min: usize,
    pub m_max: usize,
}

impl Default for DavidsonParams {
    fn default() -> Self {
        Self {
            n_eig: 1,
            eps_conv: 1e-8,
            eps_sub: 1e-10,
            max_iter: 100,
            m_min: 1,
            m_max: 20,
        }
    }
}

impl From<DavidsonParams> for crate::davidson::DavidsonParams {
    fn from(p: DavidsonParams) -> Self {
        Self {
            n_eig: p.n_eig,
            eps_conv: p.eps_conv,
            eps_sub: p.eps_sub,
            max_iter: p.max_iter,
            m_min: p.m_min,
            m_max: p.m_max,
        }
    }
}

/// One CIPSI cycle's configuration: the Davidson parameters plus the
/// worker count used for the constraint partition and the number of
/// determinants the PT2 selector should propose.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CipsiConfig {
    #[serde(default)]
    pub davidson: DavidsonParams,
    #[serde(default = "default_n_workers")]
    pub n_workers: usize,
    #[serde(default = "default_n_select")]
    pub n_select: usize,
}

fn default_n_workers() -> usize {
    1
}

fn default_n_select() -> usize {
    10
}

impl Default for CipsiConfig {
    fn default() -> Self {
        Self {
            davidson: DavidsonParams::default(),
            n_workers: default_n_workers(),
            n_select: default_n_select(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrips_through_json() {
        let config = CipsiConfig::default();
        let text = serde_json::to_string(&config).unwrap();
        let back: CipsiConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back.n_workers, config.n_workers);
        assert_eq!(back.n_select, config.n_select);
        assert_eq!(back.davidson.n_eig, config.davidson.n_eig);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let text = "n_select: 5\n";
        let config: CipsiConfig = serde_yaml::from_str(text).unwrap();
        assert_eq!(config.n_select, 5);
        assert_eq!(config.n_workers, default_n_workers());
        assert_eq!(config.davidson.max_iter, DavidsonParams::default().max_iter);
    }
}
