/// Builds a [`Value`](crate::Value) tree from a literal-like syntax.
///
/// Mapping keys are string literals. Anything else falls back to
/// [`to_value`](crate::to_value); a value that cannot be converted becomes null.
/// Negative numbers inside sequences or mappings need parentheses: `(-1)`.
///
/// ```rust
/// use serde_conf::{conf, Value};
///
/// let doc = conf!({
///     "num": 1337,
///     "nested": { "str": "bar" },
///     "list": ["a", (-1), null]
/// });
///
/// assert_eq!(doc.get("num").and_then(Value::as_i64), Some(1337));
/// ```
#[macro_export]
macro_rules! conf {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::Sequence(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Sequence(vec![$($crate::conf!($elem)),*])
    };

    ({}) => {
        $crate::Value::Mapping($crate::Mapping::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut mapping = $crate::Mapping::new();
        $(
            mapping.insert($key.to_string(), $crate::conf!($value));
        )*
        $crate::Value::Mapping(mapping)
    }};

    ($s:expr) => {
        $crate::to_value(&$s).unwrap_or($crate::Value::Null)
    };
}
