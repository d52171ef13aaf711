//! Number formatting for serialized path data and transforms.

/// Output options shared by every serializer in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Significant digits kept for every number.
    pub precision: usize,
}

impl FormatOptions {
    /// Default precision, the same as C's `%g`.
    pub const DEFAULT_PRECISION: usize = 6;

    pub fn with_precision(precision: usize) -> Self {
        Self { precision }
    }

    /// Format a single number with these options.
    pub fn num(&self, value: f64) -> String {
        fmt_num_precision(value, self.precision)
    }
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            precision: Self::DEFAULT_PRECISION,
        }
    }
}

/// Format a number like `%g` (6 significant figures, trailing zeros trimmed),
/// but never in exponent notation.
pub fn fmt_num(value: f64) -> String {
    fmt_num_precision(value, FormatOptions::DEFAULT_PRECISION)
}

/// Format a number with the given significant figures, trailing zeros trimmed.
pub fn fmt_num_precision(value: f64, sig_figs: usize) -> String {
    if value == 0.0 || !value.is_finite() {
        return if value.is_finite() {
            "0".to_string()
        } else {
            value.to_string()
        };
    }
    let sig_figs = sig_figs.max(1) as i32;

    // Round to specified significant figures
    let magnitude = value.abs().log10().floor() as i32;
    let scale = 10_f64.powi(sig_figs - 1 - magnitude);
    // subnormal inputs overflow the scale and sit below any printable digit
    if !scale.is_finite() {
        return "0".to_string();
    }
    let rounded = (value * scale).round() / scale;
    if rounded == 0.0 || !rounded.is_finite() {
        return "0".to_string();
    }

    // Format with enough decimal places, then trim
    let decimals = (sig_figs - 1 - magnitude).max(0) as usize;
    let s = format!("{:.prec$}", rounded, prec = decimals);
    if !s.contains('.') {
        return s;
    }
    let s = s.trim_end_matches('0');
    let s = s.trim_end_matches('.');
    s.to_string()
}

/// Round to a fixed number of decimals (halves away from zero).
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10_f64.powi(decimals as i32);
    let scaled = value * scale;
    // values past 2^53 are integers already; past 308 decimals nothing is lost
    if !scaled.is_finite() || !scale.is_finite() {
        return value;
    }
    let rounded = scaled.round() / scale;
    // avoid printing "-0"
    if rounded == 0.0 { 0.0 } else { rounded }
}
