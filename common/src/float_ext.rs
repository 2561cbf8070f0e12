pub trait FloatExt {
    /// Relative comparison: `|a - b| <= rel * max(|a|, |b|)`, exact for zeros.
    fn relatively_eq(self, other: Self, rel: Self) -> bool;
}

impl FloatExt for f64 {
    fn relatively_eq(self, other: Self, rel: Self) -> bool {
        if self == other {
            return true;
        }
        let scale = self.abs().max(other.abs());
        (self - other).abs() <= rel * scale
    }
}
