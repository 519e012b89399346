//! Vigencia engine: derives each lineage's effective-date
//! interval closure from the anchors a norm's versions imply.
//!
//! Pure function of a lineage's candidate units — no I/O. The orchestrator's
//! `build_units` stage is the only caller; it feeds this module's output
//! straight into `norma-db::repos::unidad::apply_vigencia_closure`.

use chrono::{DateTime, Utc};

use norma_core::entities::Unidad;

/// The write-back row shape `apply_vigencia_closure` expects:
/// `(id_unidad, fecha_vigencia_hasta, is_latest)`.
pub type ClosureRow = (String, Option<DateTime<Utc>>, bool);

/// Derive the `fecha_vigencia_hasta`/`is_latest` closure for one lineage.
///
/// Units are sorted by `(fecha_vigencia_desde, id_unidad)` nulls last (spec
/// §4.6 "Ordering"); each unit's `hasta` becomes the next unit's `desde`,
/// and the last unit in the order is left open (`hasta = None`) and marked
/// `is_latest`. A lineage with a single unit is always `is_latest` and open.
#[must_use]
pub fn derive_closure(units: &[Unidad]) -> Vec<ClosureRow> {
    let mut ordered: Vec<&Unidad> = units.iter().collect();
    ordered.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));

    let last_index = ordered.len().saturating_sub(1);
    ordered
        .iter()
        .enumerate()
        .map(|(i, unit)| {
            let hasta = if i == last_index { None } else { ordered[i + 1].fecha_vigencia_desde };
            (unit.id_unidad.clone(), hasta, i == last_index)
        })
        .collect()
}

fn sort_key(unit: &Unidad) -> (i64, &str) {
    let desde = unit.fecha_vigencia_desde.map_or(i64::MAX, |d| d.timestamp_millis());
    (desde, unit.id_unidad.as_str())
}

/// Is `unidad` active at instant `at`, per its closed-open
/// `[fecha_vigencia_desde, fecha_vigencia_hasta)` interval (absent bounds
/// are unconstrained on that side)?
#[must_use]
pub fn is_active_at(unidad: &Unidad, at: DateTime<Utc>) -> bool {
    let after_start = unidad.fecha_vigencia_desde.is_none_or(|desde| desde <= at);
    let before_end = unidad.fecha_vigencia_hasta.is_none_or(|hasta| at < hasta);
    after_start && before_end
}
