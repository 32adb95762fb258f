//! Formatted terminal output.
//!
//! Formatting lives here so the simulation code returns plain records and never
//! prints.

use crate::domain::{AssembledModel, PairDistribution, SubunitReport, TheoreticalCurve};
use crate::models::ShapeRegistry;

/// Run summary: per-subunit point bookkeeping followed by model totals.
pub fn format_run_summary(
    name: &str,
    model: &AssembledModel,
    pair: &PairDistribution,
    curve: &TheoreticalCurve,
) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== shape2sas - {name} ===\n"));
    out.push_str(&format_subunit_table(&model.subunits));
    out.push('\n');

    out.push_str(&format!(
        "Points: requested={} | remaining={}\n",
        model.requested_points(),
        model.cloud.len()
    ));
    out.push_str(&format!("Total volume: {:.4e} A^3\n", model.total_volume));
    out.push_str(&format!(
        "Dmax={:.2} A | Rg={:.2} A | I0={:.4e}\n",
        pair.d_max, pair.rg, curve.i0
    ));

    out
}

/// One row per subunit, in declaration order.
pub fn format_subunit_table(rows: &[SubunitReport]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<3} {:<20} {:>9} {:>9} {:>9} {:>12} {:>12}",
            "#", "shape", "requested", "excluded", "remaining", "density", "sc.density"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(&format!(
        "{:-<3} {:-<20} {:-<9} {:-<9} {:-<9} {:-<12} {:-<12}\n",
        "", "", "", "", "", "", ""
    ));

    for (i, r) in rows.iter().enumerate() {
        out.push_str(
            format!(
                "{:<3} {:<20} {:>9} {:>9} {:>9} {:>12.4e} {:>12.4e}",
                i,
                truncate(&r.shape, 20),
                r.requested,
                r.excluded,
                r.remaining,
                r.density,
                r.scattering_density,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Registered shape tags with their dimension labels.
pub fn format_shape_list(registry: &ShapeRegistry) -> String {
    let mut out = String::new();
    for tag in registry.tags() {
        if let Ok(provider) = registry.resolve(tag) {
            out.push_str(&format!(
                "{:<22} [{}]\n",
                tag,
                provider.dimension_labels().join(", ")
            ));
        }
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
