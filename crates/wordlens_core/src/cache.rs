use crate::Term;

/// The last term set fetched for the active job.
///
/// Contents are replaced wholesale by [`ResultCache::set_results`]; the only
/// in-place mutation is the dictionary flag patch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultCache {
    terms: Vec<Term>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_results(&mut self, terms: Vec<Term>) {
        self.terms = terms;
    }

    pub fn clear(&mut self) {
        self.terms.clear();
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn find(&self, text: &str) -> Option<&Term> {
        self.terms.iter().find(|term| term.text == text)
    }

    /// Terms whose text is at least `min_length` characters, in cached order.
    pub fn derive_view(&self, min_length: usize) -> Vec<&Term> {
        self.terms
            .iter()
            .filter(|term| term.char_len() >= min_length)
            .collect()
    }

    /// Sets `in_dictionary` on every cached term with this text.
    /// Returns how many entries were touched.
    pub fn patch_dictionary_flag(&mut self, text: &str, in_dictionary: bool) -> usize {
        let mut patched = 0;
        for term in self.terms.iter_mut().filter(|term| term.text == text) {
            term.in_dictionary = in_dictionary;
            patched += 1;
        }
        patched
    }
}
