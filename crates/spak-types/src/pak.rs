use indexmap::IndexMap;

/// In-memory container of named shader bytecode blobs.
///
/// Backed by an insertion-ordered map so every package format writes entries
/// in a stable, reproducible order. Overwriting an existing name keeps the
/// entry at its original position.
///
/// The container has no internal synchronization; share it immutably while a
/// save is in progress.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShaderPak {
    shaders: IndexMap<String, Vec<u8>>,
}

impl ShaderPak {
    /// Create a new empty package.
    pub fn new() -> Self {
        Self {
            shaders: IndexMap::new(),
        }
    }

    /// Create an empty package with room for `capacity` shaders.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            shaders: IndexMap::with_capacity(capacity),
        }
    }

    /// Add a shader, overwriting any existing bytecode with the same name.
    ///
    /// Returns the previous bytecode if the name was already present.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        bytecode: impl Into<Vec<u8>>,
    ) -> Option<Vec<u8>> {
        self.shaders.insert(name.into(), bytecode.into())
    }

    /// Look up the bytecode stored under `name`.
    pub fn try_get(&self, name: &str) -> Option<&[u8]> {
        self.shaders.get(name).map(Vec::as_slice)
    }

    /// Returns `true` if a shader named `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.shaders.contains_key(name)
    }

    /// Shader names in write order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.shaders.keys().map(String::as_str)
    }

    /// (name, bytecode) pairs in write order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.shaders
            .iter()
            .map(|(name, code)| (name.as_str(), code.as_slice()))
    }

    /// Number of shaders.
    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    /// Returns `true` if the package holds no shaders.
    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }

    /// Total uncompressed bytecode size across all shaders.
    pub fn total_bytes(&self) -> u64 {
        self.shaders.values().map(|code| code.len() as u64).sum()
    }
}

impl<N, B> FromIterator<(N, B)> for ShaderPak
where
    N: Into<String>,
    B: Into<Vec<u8>>,
{
    fn from_iter<I: IntoIterator<Item = (N, B)>>(iter: I) -> Self {
        let mut pak = ShaderPak::new();
        pak.extend(iter);
        pak
    }
}

impl<N, B> Extend<(N, B)> for ShaderPak
where
    N: Into<String>,
    B: Into<Vec<u8>>,
{
    fn extend<I: IntoIterator<Item = (N, B)>>(&mut self, iter: I) {
        for (name, bytecode) in iter {
            self.add(name, bytecode);
        }
    }
}

impl<'a> IntoIterator for &'a ShaderPak {
    type Item = (&'a String, &'a Vec<u8>);
    type IntoIter = indexmap::map::Iter<'a, String, Vec<u8>>;

    fn into_iter(self) -> Self::IntoIter {
        self.shaders.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_is_empty() {
        let pak = ShaderPak::new();
        assert!(pak.is_empty());
        assert_eq!(pak.len(), 0);
        assert_eq!(pak.total_bytes(), 0);
    }

    #[test]
    fn add_and_get() {
        let mut pak = ShaderPak::new();
        assert!(pak.add("vs_main", vec![1, 2, 3, 4]).is_none());
        assert_eq!(pak.try_get("vs_main"), Some(&[1u8, 2, 3, 4][..]));
        assert!(pak.try_get("ps_main").is_none());
        assert!(pak.contains("vs_main"));
    }

    #[test]
    fn add_overwrites_in_place() {
        let mut pak = ShaderPak::new();
        pak.add("a", vec![1]);
        pak.add("b", vec![2]);
        let previous = pak.add("a", vec![9, 9]);

        assert_eq!(previous, Some(vec![1]));
        assert_eq!(pak.len(), 2);
        assert_eq!(pak.try_get("a"), Some(&[9u8, 9][..]));
        assert_eq!(pak.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn empty_name_and_empty_bytecode() {
        let mut pak = ShaderPak::new();
        pak.add("", Vec::new());
        assert_eq!(pak.try_get(""), Some(&[][..]));
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let pak: ShaderPak = [("z", vec![0u8]), ("a", vec![1]), ("m", vec![2])]
            .into_iter()
            .collect();
        let names: Vec<_> = pak.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn equality_ignores_order() {
        let a: ShaderPak = [("x", vec![1u8]), ("y", vec![2])].into_iter().collect();
        let b: ShaderPak = [("y", vec![2u8]), ("x", vec![1])].into_iter().collect();
        assert_eq!(a, b);

        let c: ShaderPak = [("x", vec![1u8]), ("y", vec![3])].into_iter().collect();
        assert_ne!(a, c);
    }

    #[test]
    fn total_bytes_sums_bytecode() {
        let pak: ShaderPak = [("a", vec![0u8; 10]), ("b", vec![0u8; 5])]
            .into_iter()
            .collect();
        assert_eq!(pak.total_bytes(), 15);
    }

    proptest! {
        #[test]
        fn last_add_wins(
            entries in proptest::collection::vec(
                (".{0,8}", proptest::collection::vec(any::<u8>(), 0..16)),
                0..32,
            )
        ) {
            let mut pak = ShaderPak::new();
            for (name, code) in &entries {
                pak.add(name.clone(), code.clone());
            }
            for (name, _) in &entries {
                let last = entries
                    .iter()
                    .rev()
                    .find(|(n, _)| n == name)
                    .map(|(_, c)| c.as_slice());
                prop_assert_eq!(pak.try_get(name), last);
            }
        }
    }
}
