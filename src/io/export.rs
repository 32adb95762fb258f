//! Plain-text dumps of p(r), S(q), I(q) and the simulated dataset.
//!
//! Whitespace separated columns, one `#` header line, every value formatted like
//! C's `%.5e` (`1.23450e+02`) so files diff cleanly against other tools.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::domain::{PairDistribution, SimulatedData, TheoreticalCurve};
use crate::error::AppError;

/// Format a value as `%.5e` with a signed, two-digit minimum exponent.
pub fn format_sci(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let s = format!("{v:.5e}");
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.abs())
        }
        None => s,
    }
}

/// Write equal-length columns under a `# ...` header.
pub fn write_columns(path: &Path, header: &str, columns: &[&[f64]]) -> Result<(), AppError> {
    let rows = columns.first().map_or(0, |c| c.len());
    if let Some(bad) = columns.iter().find(|c| c.len() != rows) {
        return Err(AppError::new(
            4,
            format!(
                "Cannot write '{}': column lengths differ ({rows} vs {}).",
                path.display(),
                bad.len()
            ),
        ));
    }

    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);
    let write_err = |e: std::io::Error| AppError::new(2, format!("Failed to write '{}': {e}", path.display()));

    writeln!(out, "# {header}").map_err(write_err)?;
    for i in 0..rows {
        let line: Vec<String> = columns.iter().map(|c| format_sci(c[i])).collect();
        writeln!(out, "{}", line.join(" ")).map_err(write_err)?;
    }
    out.flush().map_err(write_err)?;
    Ok(())
}

/// `pr_<name>.dat`: r and normalised p(r).
pub fn write_pr(dir: &Path, name: &str, pair: &PairDistribution) -> Result<PathBuf, AppError> {
    let path = dir.join(format!("pr_{name}.dat"));
    write_columns(&path, "r p(r)", &[pair.r.as_slice(), pair.pr_norm.as_slice()])?;
    Ok(path)
}

/// `Iq_<name>.dat`: q and theoretical I(q).
pub fn write_iq(dir: &Path, name: &str, curve: &TheoreticalCurve) -> Result<PathBuf, AppError> {
    let path = dir.join(format!("Iq_{name}.dat"));
    write_columns(&path, "q I", &[curve.q.as_slice(), curve.iq.as_slice()])?;
    Ok(path)
}

/// `Sq_<name>.dat`: q and the effective structure factor.
pub fn write_seff(dir: &Path, name: &str, curve: &TheoreticalCurve) -> Result<PathBuf, AppError> {
    let path = dir.join(format!("Sq_{name}.dat"));
    write_columns(&path, "q S_eff", &[curve.q.as_slice(), curve.s_eff.as_slice()])?;
    Ok(path)
}

/// `Isim_<name>.dat`: q, simulated I(q) and σ.
pub fn write_isim(dir: &Path, name: &str, sim: &SimulatedData) -> Result<PathBuf, AppError> {
    let path = dir.join(format!("Isim_{name}.dat"));
    write_columns(&path, "q I sigma", &[sim.q.as_slice(), sim.intensity.as_slice(), sim.sigma.as_slice()])?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scientific_format_matches_c_printf() {
        assert_eq!(format_sci(123.45), "1.23450e+02");
        assert_eq!(format_sci(0.001), "1.00000e-03");
        assert_eq!(format_sci(-2.5), "-2.50000e+00");
        assert_eq!(format_sci(0.0), "0.00000e+00");
        assert_eq!(format_sci(6.02e123), "6.02000e+123");
        assert_eq!(format_sci(f64::NAN), "nan");
    }

    #[test]
    fn dumps_have_header_and_aligned_rows() {
        let dir = tempfile::tempdir().unwrap();
        let sim = SimulatedData {
            q: vec![0.1, 0.2],
            intensity: vec![1.0, 0.5],
            sigma: vec![0.01, 0.02],
        };
        let path = write_isim(dir.path(), "Model_1", &sim).unwrap();
        assert_eq!(path.file_name().unwrap(), "Isim_Model_1.dat");

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "# q I sigma");
        assert_eq!(lines[1], "1.00000e-01 1.00000e+00 1.00000e-02");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn mismatched_columns_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_columns(&dir.path().join("x.dat"), "a b", &[&[1.0][..], &[1.0, 2.0][..]]).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn structure_factor_dump_pairs_q_with_s_eff() {
        let dir = tempfile::tempdir().unwrap();
        let curve = TheoreticalCurve {
            q: vec![0.1, 0.2],
            i0: 1.0,
            pq: vec![1.0, 0.5],
            s_eff: vec![1.0, 0.75],
            iq: vec![1.0, 0.375],
        };
        let path = write_seff(dir.path(), "rod", &curve).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "# q S_eff\n1.00000e-01 1.00000e+00\n2.00000e-01 7.50000e-01\n");
    }

    #[test]
    fn unwritable_location_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no_such_dir");
        let pair = PairDistribution {
            r: vec![1.0],
            pr: vec![1.0],
            pr_norm: vec![1.0],
            dr: 2.0,
            r_max: 2.0,
            d_max: 2.0 / 1.05,
            rg: 0.7,
        };
        assert_eq!(write_pr(&missing, "m", &pair).unwrap_err().exit_code(), 2);
    }
}
