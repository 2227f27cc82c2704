use std::cmp::Ordering;

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::models::{TaxonomyItem, TaxonomyPatch};

/// Defaults applied to every record entering a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryDefaults {
    /// Value for records that carry no `active` flag.
    pub active: bool,
}

impl Default for EntryDefaults {
    fn default() -> Self {
        Self { active: true }
    }
}

/// A record that can live in a [`SortedCollection`].
pub trait Entry: Clone {
    type Patch;

    fn id(&self) -> Option<i64>;

    fn sort_name(&self) -> &str;

    fn normalized(self, defaults: EntryDefaults) -> Self;

    fn apply(&mut self, patch: &Self::Patch);

    /// Merge a fresher copy of the same record into `self`.
    fn absorb(&mut self, incoming: Self);
}

impl Entry for TaxonomyItem {
    type Patch = TaxonomyPatch;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn sort_name(&self) -> &str {
        &self.name
    }

    fn normalized(mut self, defaults: EntryDefaults) -> Self {
        self.active = Some(self.is_active(defaults.active));
        self
    }

    fn apply(&mut self, patch: &TaxonomyPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(active) = patch.active {
            self.active = Some(active);
        }
    }

    fn absorb(&mut self, incoming: Self) {
        self.name = incoming.name;
        self.description = incoming.description;
        if incoming.active.is_some() {
            self.active = incoming.active;
        }
        if incoming.created_at.is_some() {
            self.created_at = incoming.created_at;
        }
        if incoming.updated_at.is_some() {
            self.updated_at = incoming.updated_at;
        }
    }
}

/// Local mirror of a server collection: sorted by name, unique by id.
///
/// Every method leaves the sequence sorted and duplicate-free before it
/// returns; callers publish the whole collection afterwards, so nobody sees a
/// half-merged state.
#[derive(Debug, Clone, PartialEq)]
pub struct SortedCollection<T: Entry> {
    items: Vec<T>,
    defaults: EntryDefaults,
}

impl<T: Entry> Default for SortedCollection<T> {
    fn default() -> Self {
        Self::new(EntryDefaults::default())
    }
}

impl<T: Entry> SortedCollection<T> {
    pub fn new(defaults: EntryDefaults) -> Self {
        Self {
            items: Vec::new(),
            defaults,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn position(&self, id: i64) -> Option<usize> {
        self.items.iter().position(|item| item.id() == Some(id))
    }

    pub fn get(&self, id: i64) -> Option<&T> {
        self.position(id).map(|idx| &self.items[idx])
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn replace_all(&mut self, incoming: Vec<T>) {
        let mut next: Vec<T> = Vec::with_capacity(incoming.len());
        for item in incoming {
            let item = item.normalized(self.defaults);
            let existing = item
                .id()
                .and_then(|id| next.iter().position(|x| x.id() == Some(id)));
            match existing {
                Some(idx) => next[idx].absorb(item),
                None => next.push(item),
            }
        }
        sort_by_name(&mut next);
        self.items = next;
    }

    /// Merge into the entry with the same id, or insert. Records without an
    /// id are ignored. Returns whether anything changed.
    pub fn upsert(&mut self, item: T) -> bool {
        let Some(id) = item.id() else {
            return false;
        };

        let item = item.normalized(self.defaults);
        match self.position(id) {
            Some(idx) => self.items[idx].absorb(item),
            None => self.items.push(item),
        }
        sort_by_name(&mut self.items);
        true
    }

    /// Apply `patch` to the entry with `id`. Unknown ids are a no-op.
    pub fn patch_by_id(&mut self, id: i64, patch: &T::Patch, resort: bool) -> bool {
        let Some(idx) = self.position(id) else {
            return false;
        };

        self.items[idx].apply(patch);
        if resort {
            sort_by_name(&mut self.items);
        }
        true
    }

    /// Put back an exact earlier copy of the entry with `id`.
    pub fn restore(&mut self, id: i64, snapshot: T) -> bool {
        let Some(idx) = self.position(id) else {
            return false;
        };

        self.items[idx] = snapshot;
        sort_by_name(&mut self.items);
        true
    }

    /// Owned view of the entries matching `pred`, in collection order.
    pub fn filter<F>(&self, pred: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        self.items.iter().filter(|item| pred(item)).cloned().collect()
    }
}

fn sort_by_name<T: Entry>(items: &mut [T]) {
    items.sort_by(|a, b| collate(a.sort_name(), b.sort_name()));
}

/// Locale-style string ordering: base letters first, then accents, then case
/// (lowercase before uppercase).
pub fn collate(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(&primary_key(b))
        .then_with(|| accent_key(a).cmp(&accent_key(b)))
        .then_with(|| case_key(a).cmp(&case_key(b)))
}

/// Lowercase base letters: decomposed, combining marks dropped.
fn primary_key(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
    {
        match base_letter(ch) {
            Some(base) => out.push_str(base),
            None => out.push(ch),
        }
    }
    out
}

/// Letters without a canonical decomposition that still sort with a Latin base.
fn base_letter(ch: char) -> Option<&'static str> {
    let base = match ch {
        'ł' => "l",
        'ø' => "o",
        'đ' | 'ð' => "d",
        'ħ' => "h",
        'ı' => "i",
        'ŧ' => "t",
        'æ' => "ae",
        'œ' => "oe",
        'ß' => "ss",
        'þ' => "th",
        _ => return None,
    };
    Some(base)
}

fn accent_key(s: &str) -> String {
    s.nfd().flat_map(char::to_lowercase).collect()
}

fn case_key(s: &str) -> Vec<bool> {
    s.chars().map(char::is_uppercase).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, name: &str) -> TaxonomyItem {
        TaxonomyItem {
            id: Some(id),
            name: name.to_string(),
            description: None,
            active: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn names(c: &SortedCollection<TaxonomyItem>) -> Vec<&str> {
        c.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn collation_ignores_case_and_accents_first() {
        assert_eq!(collate("apple", "Banana"), Ordering::Less);
        assert_eq!(collate("Äpfel", "Birnen"), Ordering::Less);
        assert_eq!(collate("a", "A"), Ordering::Less);
        assert_eq!(collate("zebra", "Zebra"), Ordering::Less);
        assert_eq!(collate("same", "same"), Ordering::Equal);
    }

    #[test]
    fn accented_and_stroked_letters_sort_with_their_base() {
        assert_eq!(collate("Šimon", "Zed"), Ordering::Less);
        assert_eq!(collate("Łukasz", "Mark"), Ordering::Less);
        assert_eq!(collate("Čaj", "Dev"), Ordering::Less);
        assert_eq!(collate("Ōsaka", "Paris"), Ordering::Less);
        assert_eq!(collate("Ørsted", "Paris"), Ordering::Less);
        assert_eq!(collate("cafe", "café"), Ordering::Less);
        assert_eq!(collate("café", "cafes"), Ordering::Less);

        let mut c = SortedCollection::default();
        c.replace_all(vec![item(1, "Zed"), item(2, "Šimon"), item(3, "Łukasz"), item(4, "Anna")]);
        assert_eq!(names(&c), vec!["Anna", "Łukasz", "Šimon", "Zed"]);
    }

    #[test]
    fn replace_all_normalizes_sorts_and_dedupes() {
        let mut c = SortedCollection::default();
        c.replace_all(vec![item(2, "meetings"), item(1, "Admin"), item(2, "Meetings")]);

        assert_eq!(names(&c), vec!["Admin", "Meetings"]);
        assert!(c.iter().all(|i| i.active == Some(true)));
    }

    #[test]
    fn legacy_default_can_be_inactive() {
        let mut c = SortedCollection::new(EntryDefaults { active: false });
        c.replace_all(vec![item(1, "Admin")]);
        assert_eq!(c.get(1).and_then(|i| i.active), Some(false));
    }

    #[test]
    fn upsert_of_unchanged_entry_is_idempotent() {
        let mut c = SortedCollection::default();
        c.replace_all(vec![item(1, "Admin"), item(2, "Dev"), item(3, "Calls")]);
        let before = c.clone();

        assert!(c.upsert(item(2, "Dev")));
        assert_eq!(c, before);
    }

    #[test]
    fn upsert_renames_and_inserts_in_order() {
        let mut c = SortedCollection::default();
        c.replace_all(vec![item(1, "Admin"), item(2, "Dev")]);

        c.upsert(item(1, "Zulu"));
        c.upsert(item(3, "Calls"));
        assert_eq!(names(&c), vec!["Calls", "Dev", "Zulu"]);

        let mut without_id = item(0, "Ghost");
        without_id.id = None;
        assert!(!c.upsert(without_id));
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn patch_resorts_only_on_request() {
        let mut c = SortedCollection::default();
        c.replace_all(vec![item(1, "Admin"), item(2, "Dev")]);

        assert!(c.patch_by_id(1, &TaxonomyPatch::name("Zulu"), false));
        assert_eq!(names(&c), vec!["Zulu", "Dev"]);

        assert!(c.patch_by_id(2, &TaxonomyPatch::description("code"), true));
        assert_eq!(names(&c), vec!["Dev", "Zulu"]);

        assert!(!c.patch_by_id(99, &TaxonomyPatch::active(false), true));
    }

    #[test]
    fn restore_puts_back_the_exact_snapshot() {
        let mut c = SortedCollection::default();
        c.replace_all(vec![item(1, "Admin"), item(2, "Dev")]);
        let snapshot = c.get(1).cloned().unwrap();

        c.patch_by_id(1, &TaxonomyPatch::name("Zulu"), true);
        assert!(c.restore(1, snapshot.clone()));

        assert_eq!(c.get(1), Some(&snapshot));
        assert_eq!(names(&c), vec!["Admin", "Dev"]);
    }

    #[test]
    fn filter_returns_a_detached_view() {
        let mut c = SortedCollection::default();
        c.replace_all(vec![item(1, "Admin"), item(2, "Dev")]);
        c.patch_by_id(2, &TaxonomyPatch::active(false), false);

        let inactive = c.filter(|i| i.active == Some(false));
        assert_eq!(inactive.len(), 1);
        assert_eq!(c.len(), 2);
    }
}
