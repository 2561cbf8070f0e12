use hashbrown::HashMap;

/// Sparse counts keyed by `(level, size)`, both 1-based.
///
/// "Size" is a run length for GLRLM, a zone area for GLSZM and a dependence
/// count for GLDM; the three share one feature formula set.
#[derive(Debug, Default)]
pub(crate) struct SizeMatrix {
    counts: HashMap<(usize, usize), u64>,
}

impl SizeMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add(&mut self, level: usize, size: usize) {
        debug_assert!(level > 0 && size > 0);
        *self.counts.entry((level, size)).or_insert(0) += 1;
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// `(level, size, count)` for every non-empty cell, ordered by level then size.
    pub fn entries(&self) -> Vec<(f64, f64, f64)> {
        let mut cells: Vec<_> = self.counts.iter().map(|(&key, &c)| (key, c)).collect();
        cells.sort_unstable_by_key(|&(key, _)| key);
        cells
            .into_iter()
            .map(|((level, size), c)| (level as f64, size as f64, c as f64))
            .collect()
    }
}

/// Row and column sums of the matrix, `(per level, per size)`.
fn marginals(entries: &[(f64, f64, f64)]) -> (Vec<f64>, Vec<f64>) {
    let mut by_level: Vec<(f64, f64)> = Vec::new();
    for &(i, _, c) in entries {
        match by_level.last_mut() {
            Some((level, total)) if *level == i => *total += c,
            _ => by_level.push((i, c)),
        }
    }

    let mut sizes: Vec<(f64, f64)> = entries.iter().map(|&(_, j, c)| (j, c)).collect();
    sizes.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut by_size: Vec<(f64, f64)> = Vec::new();
    for (j, c) in sizes {
        match by_size.last_mut() {
            Some((size, total)) if *size == j => *total += c,
            _ => by_size.push((j, c)),
        }
    }

    (
        by_level.into_iter().map(|(_, t)| t).collect(),
        by_size.into_iter().map(|(_, t)| t).collect(),
    )
}

/// The 16 emphasis features in GLRLM/GLSZM output order:
/// `[SE, LE, GLN, GLNN, SN, SNN, P, GLV, SV, E, LGLE, HGLE, SLGLE, SHGLE, LLGLE, LHGLE]`
/// where `S`/`L` are small/large size and `P` is cells per ROI pixel.
pub(crate) fn emphasis_features(m: &SizeMatrix, pixel_count: usize) -> [f64; 16] {
    let n = m.total() as f64;
    if n == 0.0 {
        return [0.0; 16];
    }
    let entries = m.entries();

    let (mut se, mut le, mut lgle, mut hgle) = (0.0, 0.0, 0.0, 0.0);
    let (mut slgle, mut shgle, mut llgle, mut lhgle) = (0.0, 0.0, 0.0, 0.0);
    let (mut mu_i, mut mu_j, mut entropy) = (0.0, 0.0, 0.0);
    for &(i, j, c) in &entries {
        let p = c / n;
        let (i2, j2) = (i * i, j * j);
        se += p / j2;
        le += p * j2;
        lgle += p / i2;
        hgle += p * i2;
        slgle += p / (i2 * j2);
        shgle += p * i2 / j2;
        llgle += p * j2 / i2;
        lhgle += p * i2 * j2;
        mu_i += p * i;
        mu_j += p * j;
        entropy -= p * p.log2();
    }
    let (mut glv, mut sv) = (0.0, 0.0);
    for &(i, j, c) in &entries {
        let p = c / n;
        glv += p * (i - mu_i).powi(2);
        sv += p * (j - mu_j).powi(2);
    }

    let (levels, sizes) = marginals(&entries);
    let gln_sum: f64 = levels.iter().map(|t| t * t).sum();
    let sn_sum: f64 = sizes.iter().map(|t| t * t).sum();

    [
        se,
        le,
        gln_sum / n,
        gln_sum / (n * n),
        sn_sum / n,
        sn_sum / (n * n),
        n / pixel_count as f64,
        glv,
        sv,
        entropy,
        lgle,
        hgle,
        slgle,
        shgle,
        llgle,
        lhgle,
    ]
}
