/// 선택된 태그 이름 집합. 선택한 순서를 유지하고 중복은 넣지 않는다.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TagSelection {
    names: Vec<String>,
}

impl TagSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// 없으면 넣고 `true`, 이미 있으면 `false`
    pub fn insert(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.names.push(name.to_string());
        true
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.names.len();
        self.names.retain(|n| n != name);
        before != self.names.len()
    }

    /// 선택 여부를 뒤집고 뒤집은 뒤의 선택 여부를 돌려준다.
    pub fn toggle(&mut self, name: &str) -> bool {
        if !self.remove(name) {
            self.names.push(name.to_string());
            return true;
        }
        false
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagSelection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut selection = TagSelection::new();
        for name in iter {
            selection.insert(name.as_ref());
        }
        selection
    }
}
