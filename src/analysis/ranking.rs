use crate::model::{DerivedRecord, MetricKey};

/// The `n` records with the largest `key`, largest first. Ties go to the
/// district name, then the division, ascending. Records where `key` is
/// undefined are skipped.
pub fn top_n(derived: &[DerivedRecord], n: usize, key: MetricKey) -> Vec<&DerivedRecord> {
    let mut ranked: Vec<(&DerivedRecord, f64)> = derived
        .iter()
        .filter_map(|d| d.value(key).map(|v| (d, v)))
        .collect();

    ranked.sort_by(|(a, va), (b, vb)| {
        vb.total_cmp(va)
            .then_with(|| a.record.district.cmp(&b.record.district))
            .then_with(|| a.record.division.cmp(&b.record.division))
    });

    ranked.into_iter().take(n).map(|(d, _)| d).collect()
}
