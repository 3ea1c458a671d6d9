use std::{
    fs,
    path::Path,
};

use cipsi_core::{
    comm::SingleRank,
    config::CipsiConfig,
    davidson,
    hamiltonian::{
        Driver as CoreDriver,
        HamiltonianGenerator,
    },
    io,
    pt2,
};
use serde::Serialize;

use crate::{
    args::{
        Driver,
        Format,
        Run,
    },
    errors::Error,
};

#[derive(Debug, Serialize)]
struct DeterminantView {
    alpha: Vec<u32>,
    beta: Vec<u32>,
}

#[derive(Debug, Serialize)]
struct Selected {
    det: DeterminantView,
    e_pt2: f64,
}

#[derive(Debug, Serialize)]
struct Report {
    n_basis: usize,
    e_var: f64,
    e_pt2: f64,
    e_total: f64,
    selected: Vec<Selected>,
}

fn load_config(args: &Run) -> Result<CipsiConfig, Error> {
    let Some(path) = &args.config_file else {
        return Ok(CipsiConfig::default());
    };
    let text = fs::read_to_string(path)?;
    Ok(match args.config_format {
        Format::Json => serde_json::from_str(&text)?,
        Format::Yaml => serde_yaml::from_str(&text)?,
        Format::Toml => toml::from_str(&text)?,
    })
}

pub fn run(args: &Run) -> Result<(), Error> {
    let config = load_config(args)?;

    log::info!("loading integrals from {}", args.integrals);
    let store = io::read_fcidump(Path::new(&args.integrals))?;

    log::info!("loading wavefunction from {}", args.wavefunction);
    let wf = io::read_wavefunction(Path::new(&args.wavefunction))?;
    if wf.is_empty() {
        return Err(Error::CmdArgs {
            msg: "wavefunction file has no determinants".to_owned(),
        });
    }

    let n_alpha = args.n_alpha.unwrap_or_else(|| wf.det[0].alpha.len());

    if config.n_workers > 1 {
        log::warn!(
            "n_workers={} requested, but the cipsi binary runs a single CIPSI cycle on one rank; \
             the distributed constraint partition degenerates to a single shard",
            config.n_workers
        );
    }
    let comm = SingleRank;

    let core_driver = match args.driver {
        Driver::Determinant => CoreDriver::DeterminantDriven,
        Driver::Integral => CoreDriver::IntegralDriven,
    };
    log::debug!("building Hamiltonian generator ({} determinants, {:?})", wf.len(), core_driver);
    let mut gen = HamiltonianGenerator::new(&store, &wf.det, &comm, core_driver);

    let davidson_params: davidson::DavidsonParams = config.davidson.clone().into();
    log::info!("running Davidson with max_iter={}, eps_conv={}", davidson_params.max_iter, davidson_params.eps_conv);
    let result = davidson::davidson(&mut gen, &comm, &davidson_params, vec![wf.coef.clone()])?;
    let e_var = result.eigenvalues[0];
    let coeffs = &result.eigenvectors[0];
    log::info!("E_var = {e_var}");

    let (e_pt2, selected) = if args.no_pt2 {
        (0.0, Vec::new())
    } else {
        log::debug!("scoring PT2 external space via {:?}", core_driver);
        let candidates = match args.driver {
            Driver::Determinant => {
                pt2::score_determinant_driven(&comm, &wf.det, coeffs, &store, e_var, n_alpha, store.n_orb)
            }
            Driver::Integral => {
                pt2::score_integral_driven(&comm, &wf.det, coeffs, &store, e_var, n_alpha, store.n_orb)
            }
        };
        let e_pt2 = pt2::total_correction(&comm, &candidates);
        log::info!("E_PT2 = {e_pt2}");

        let selected = if config.n_select > 0 {
            let local_top = pt2::select_top_n(candidates, config.n_select);
            pt2::global_top_n(&comm, local_top, config.n_select)
                .into_iter()
                .map(|c| Selected {
                    det: DeterminantView {
                        alpha: c.det.alpha.occupied().collect(),
                        beta: c.det.beta.occupied().collect(),
                    },
                    e_pt2: c.e_pt2,
                })
                .collect()
        } else {
            Vec::new()
        };
        (e_pt2, selected)
    };

    let report = Report {
        n_basis: wf.len(),
        e_var,
        e_pt2,
        e_total: e_var + e_pt2,
        selected,
    };

    let text = serialize_report(&report, args)?;
    match &args.output_file {
        Some(path) => fs::write(path, text)?,
        None => println!("{text}"),
    }

    Ok(())
}

fn serialize_report(
    report: &Report,
    args: &Run,
) -> Result<String, Error> {
    Ok(match args.output_format {
        Format::Json => {
            if args.pretty_print {
                serde_json::to_string_pretty(report)
            } else {
                serde_json::to_string(report)
            }?
        }
        Format::Yaml => serde_yaml::to_string(report)?,
        Format::Toml => {
            if args.pretty_print {
                toml::to_string_pretty(report)
            } else {
                toml::to_string(report)
            }?
        }
    })
}
