//! A byte-trie used for longest-match recognition of a fixed string set.
//!
//! Adapted from the teacher's `FieldTree`, which backs `Punctuations`/`PunctuationsField`
//! — exactly the data structure needed here to recognize jq's fixed punctuation and
//! keyword set (`!=`, `==`, `|=`, `.`, `and`, ...) with the longest entry winning, e.g.
//! `"//="` over `"//"` over `"/"`.

#[derive(Debug, Clone)]
pub struct FieldTree<T> {
    token: Option<T>,
    children: Vec<(u8, FieldTree<T>)>,
}

impl<T> Default for FieldTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FieldTree<T> {
    pub fn new() -> Self {
        Self {
            token: None,
            children: Vec::new(),
        }
    }

    /// Insert `value` mapped to `token`. Returns the previously-registered token as
    /// `Err` if `value` was already present.
    pub fn insert(&mut self, value: &[u8], token: T) -> Result<(), T> {
        if !value.is_empty() {
            match self
                .children
                .binary_search_by_key(&value[0], |child| child.0)
            {
                Ok(index) => self.children[index].1.insert(&value[1..], token),
                Err(index) => {
                    let mut field = FieldTree::new();
                    field.insert(&value[1..], token)?;
                    self.children.insert(index, (value[0], field));
                    Ok(())
                }
            }
        } else {
            match self.token.replace(token) {
                Some(t) => Err(t),
                None => Ok(()),
            }
        }
    }
}

impl<T: Clone> FieldTree<T> {
    /// Find the longest prefix of `code_part` registered in the trie, returning the
    /// matched token and the number of bytes it consumed.
    pub fn find(&self, code_part: &[u8]) -> Option<(T, usize)> {
        let mut current = self;
        let mut index = 0;
        let mut best: Option<(T, usize)> = current.token.as_ref().map(|t| (t.clone(), 0));

        while index < code_part.len() {
            match current
                .children
                .binary_search_by_key(&code_part[index], |s| s.0)
            {
                Ok(i) => {
                    index += 1;
                    current = &current.children[i].1;
                    if let Some(t) = current.token.as_ref() {
                        best = Some((t.clone(), index));
                    }
                }
                Err(_) => break,
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::FieldTree;

    #[test]
    fn longest_match_wins() {
        let mut tree = FieldTree::new();
        tree.insert(b"/", "div").unwrap();
        tree.insert(b"//", "alt").unwrap();
        tree.insert(b"//=", "alt_assign").unwrap();

        assert_eq!(tree.find(b"/x"), Some(("div", 1)));
        assert_eq!(tree.find(b"//x"), Some(("alt", 2)));
        assert_eq!(tree.find(b"//=x"), Some(("alt_assign", 3)));
    }

    #[test]
    fn no_match_returns_none() {
        let mut tree = FieldTree::new();
        tree.insert(b"and", "and").unwrap();
        assert_eq!(tree.find(b"xyz"), None);
    }

    #[test]
    fn duplicate_insert_errors() {
        let mut tree = FieldTree::new();
        tree.insert(b"as", "as").unwrap();
        assert_eq!(tree.insert(b"as", "as2"), Err("as"));
    }
}
