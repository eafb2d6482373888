use std::sync::Arc;

use crate::client::MiniGraphite;

/// Wraps a callable so every invocation is benchmarked under `key_prefix`.
///
/// The returned closure forwards its argument to `f`, routes the call
/// through [`MiniGraphite::benchmark`] (emitting `<prefix>.time` and
/// `<prefix>.end`), and hands back the exact return value. Install it once
/// at setup time and call it like the callable it replaces.
///
/// Capture the receiver inside `f` to instrument an instance method; call an
/// associated function inside `f` to instrument a type-level one. Callables
/// taking several arguments are wrapped with a tuple argument.
///
/// ```no_run
/// # use std::sync::Arc;
/// # use mini_graphite::{instrument, MiniGraphiteBuilder};
/// struct Index {
///     entries: Vec<String>,
/// }
///
/// impl Index {
///     fn search(&self, term: &str) -> Vec<String> {
///         self.entries.iter().filter(|e| e.contains(term)).cloned().collect()
///     }
/// }
///
/// let client = Arc::new(MiniGraphiteBuilder::default().build()?);
/// let index = Index { entries: vec!["alpha".into(), "beta".into()] };
///
/// let search = instrument(client, "index.search", move |term: &str| index.search(term));
///
/// let hits = search("alpha");
/// assert_eq!(hits, vec!["alpha".to_string()]);
/// # Ok::<(), mini_graphite::BuildError>(())
/// ```
pub fn instrument<F, A, R>(
    client: Arc<MiniGraphite>,
    key_prefix: impl Into<String>,
    f: F,
) -> impl Fn(A) -> R
where
    F: Fn(A) -> R,
{
    let key_prefix = key_prefix.into();
    move |argument| client.benchmark(key_prefix.as_str()).run(|| f(argument))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::instrument;
    use crate::{MiniGraphite, MiniGraphiteBuilder};

    fn mock_client() -> Arc<MiniGraphite> {
        Arc::new(MiniGraphiteBuilder::default().with_mock_mode(true).build().unwrap())
    }

    struct Haystack {
        entries: Vec<&'static str>,
    }

    impl Haystack {
        fn search(&self, term: &str) -> Vec<&'static str> {
            self.entries.iter().copied().filter(|e| e.contains(term)).collect()
        }

        fn label(kind: &str, id: u32) -> String {
            format!("{kind}-{id}")
        }
    }

    #[test]
    fn wrapped_instance_method_preserves_receiver_and_arguments() {
        let haystack = Haystack { entries: vec!["alpha", "beta", "alphabet"] };
        let search =
            instrument(mock_client(), "haystack.search", move |term: &str| haystack.search(term));

        assert_eq!(search("alpha"), vec!["alpha", "alphabet"]);
        assert_eq!(search("beta"), vec!["beta"]);
    }

    #[test]
    fn wrapped_type_level_callable_preserves_arguments() {
        let label = instrument(mock_client(), "haystack.label", |(kind, id): (&str, u32)| {
            Haystack::label(kind, id)
        });

        assert_eq!(label(("widget", 7)), "widget-7");
    }
}
