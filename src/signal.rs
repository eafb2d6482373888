/// A metric value: either an integer or a floating-point number.
///
/// Values are formatted with [`itoa`]/[`ryu`], so integers never pick up a
/// fractional suffix and floats render in their shortest exact form.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MetricValue {
    /// An integer value.
    Integer(i64),

    /// A floating-point value.
    Float(f64),
}

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for MetricValue {
                fn from(value: $t) -> Self {
                    MetricValue::Integer(i64::from(value))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<usize> for MetricValue {
    fn from(value: usize) -> Self {
        MetricValue::Integer(value as i64)
    }
}

impl From<f32> for MetricValue {
    fn from(value: f32) -> Self {
        MetricValue::Float(f64::from(value))
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::Float(value)
    }
}

struct ValueFormatter {
    int_writer: itoa::Buffer,
    float_writer: ryu::Buffer,
}

impl ValueFormatter {
    fn new() -> Self {
        Self { int_writer: itoa::Buffer::new(), float_writer: ryu::Buffer::new() }
    }

    fn format(&mut self, value: MetricValue) -> &str {
        match value {
            MetricValue::Integer(v) => self.int_writer.format(v),
            MetricValue::Float(v) => self.float_writer.format(v),
        }
    }
}

/// Formats a graphite plaintext datapoint: `"<key> <value> <timestamp>"`.
///
/// The key is taken as-is; escaping protocol delimiters is the caller's
/// responsibility.
pub(crate) fn datapoint(key: &str, value: MetricValue, timestamp: u64) -> String {
    let mut formatter = ValueFormatter::new();
    let mut ts_writer = itoa::Buffer::new();

    let mut signal = String::with_capacity(key.len() + 24);
    signal.push_str(key);
    signal.push(' ');
    signal.push_str(formatter.format(value));
    signal.push(' ');
    signal.push_str(ts_writer.format(timestamp));
    signal
}

/// Formats a statsd counter: `"<key>:<value>|c"`.
pub(crate) fn counter(key: &str, value: MetricValue) -> String {
    statsd(key, value, "|c")
}

/// Formats a statsd timer: `"<key>:<value>|ms"`.
pub(crate) fn timer(key: &str, value: MetricValue) -> String {
    statsd(key, value, "|ms")
}

fn statsd(key: &str, value: MetricValue, trailer: &str) -> String {
    let mut formatter = ValueFormatter::new();

    let mut signal = String::with_capacity(key.len() + 16);
    signal.push_str(key);
    signal.push(':');
    signal.push_str(formatter.format(value));
    signal.push_str(trailer);
    signal
}
