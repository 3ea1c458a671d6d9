//! FCIDUMP integral file reader.
//!
//! Format: a header line `... NORB= <n> ...`, three further header lines
//! (ignored), then one record per line: `value i k j l`, Mulliken `(ik|jl)`
//! order. `i == 0` marks the nuclear-repulsion/core-energy offset, `j == 0`
//! marks a one-electron integral, everything else a two-electron integral.

use std::{
    fs::File,
    io::{
        BufRead,
        BufReader,
        Read,
    },
    path::Path,
};

use flate2::read::GzDecoder;
use regex::Regex;

use crate::{
    error::{
        Error,
        Result,
    },
    integrals::IntegralStore,
};

fn open_reader(path: &Path) -> Result<Box<dyn BufRead>> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    if extension == "bz2" {
        return Err(Error::InvalidIntegralFile {
            msg: "bz2-compressed FCIDUMP files are not supported (no bzip2 decoder in this build)".to_owned(),
        });
    }
    let file = File::open(path).map_err(|e| Error::InvalidIntegralFile {
        msg: format!("cannot open {}: {e}", path.display()),
    })?;
    if extension == "gz" {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

fn parse_norb(header_line: &str) -> Result<u32> {
    let re = Regex::new(r"NORB\s*=\s*(\d+)").unwrap();
    let caps = re.captures(header_line).ok_or_else(|| Error::InvalidIntegralFile {
        msg: format!("missing NORB= in header line: {header_line}"),
    })?;
    caps[1].parse().map_err(|_| Error::InvalidIntegralFile {
        msg: format!("malformed NORB= value in header line: {header_line}"),
    })
}

/// Read an FCIDUMP file (optionally `.gz`-compressed) into an
/// [`IntegralStore`].
pub fn read_fcidump(path: &Path) -> Result<IntegralStore> {
    let mut reader = open_reader(path)?;
    let mut contents = String::new();
    reader.read_to_string(&mut contents).map_err(|e| Error::InvalidIntegralFile {
        msg: format!("cannot read {}: {e}", path.display()),
    })?;
    let mut lines = contents.lines();

    let header = lines.next().ok_or_else(|| Error::InvalidIntegralFile {
        msg: "empty FCIDUMP file".to_owned(),
    })?;
    let n_orb = parse_norb(header)?;

    // Three further namelist header lines carry symmetry/electron-count
    // fields this crate does not need.
    for _ in 0..3 {
        lines.next();
    }

    let mut store = IntegralStore::new(n_orb);
    for line in lines {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 5 {
            continue;
        }
        let value: f64 = fields[0].parse().map_err(|_| Error::InvalidIntegralFile {
            msg: format!("malformed value in record: {line}"),
        })?;
        let parse_idx = |s: &str| -> Result<i64> {
            s.parse().map_err(|_| Error::InvalidIntegralFile {
                msg: format!("malformed index in record: {line}"),
            })
        };
        // File columns are the Mulliken-order (ik|jl) indices; record them
        // under the same names the record uses so the Dirac-notation
        // transform below is legible.
        let c1 = parse_idx(fields[1])?;
        let c2 = parse_idx(fields[2])?;
        let c3 = parse_idx(fields[3])?;
        let c4 = parse_idx(fields[4])?;

        if c1 == 0 {
            store.e0 = value;
        } else if c3 == 0 {
            let i = (c1 - 1) as u32;
            let k = (c2 - 1) as u32;
            store.set_one_e(i, k, value);
        } else {
            let i = (c1 - 1) as u32;
            let k = (c2 - 1) as u32;
            let j = (c3 - 1) as u32;
            let l = (c4 - 1) as u32;
            // Mulliken (ik|jl) -> Dirac <ij|kl>: swap the middle two
            // indices.
            store.set_two_e(i, j, k, l, value);
        }
    }

    Ok(store)
}
