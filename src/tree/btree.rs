//! B-tree: a multiway balanced ordered map of minimum degree `t`.
//!
//! Structurally unlike the three binary-shaped trees in this module: a page holds up to
//! `2t - 1` keys and (if internal) `2t` children, with the classical CLRS bound `t - 1 <=
//! key_count <= 2t - 1` on every non-root page, and all leaves at the same depth. Per distilled
//! spec.md §3/§4.3, pages are addressed by a stable `PageId` handle into an arena rather than
//! owning pointers, for the same reason the binary trees use [`super::arena::Arena`]: a page's
//! parent link and its children's links are mutually cyclic. Insertion splits full pages on the
//! way down so descent never enters a full page; deletion merges or borrows before descending so
//! it never enters a page at the minimum, following Cormen, Leiserson, Rivest & Stein's B-TREE
//! algorithms.

use std::cmp::Ordering;

/// A stable handle to a page in a [`BTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PageId(usize);

struct Page<K, V> {
    keys: Vec<K>,
    vals: Vec<V>,
    children: Vec<PageId>,
    parent: Option<PageId>,
    // Number of keys in the subtree rooted at this page, including its own. Backs
    // `select_by_rank`.
    subtree_len: usize,
}

impl<K, V> Page<K, V> {
    fn leaf() -> Self {
        Page {
            keys: Vec::new(),
            vals: Vec::new(),
            children: Vec::new(),
            parent: None,
            subtree_len: 0,
        }
    }
}

/// An ordered key-value map balanced as a B-tree of minimum degree `t`.
pub struct BTree<K, V> {
    t: usize,
    pages: Vec<Option<Page<K, V>>>,
    free: Vec<usize>,
    root: PageId,
    len: usize,
}

impl<K: Ord, V> BTree<K, V> {
    /// Creates an empty B-tree of minimum degree `t` (`t >= 2`).
    pub fn new(t: usize) -> Self {
        assert!(t >= 2, "B-tree minimum degree must be at least 2");
        BTree {
            t,
            pages: vec![Some(Page::leaf())],
            free: Vec::new(),
            root: PageId(0),
            len: 0,
        }
    }

    /// Is this tree empty?
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of key-value pairs stored.
    pub fn len(&self) -> usize {
        self.len
    }

    fn min_keys(&self) -> usize {
        self.t - 1
    }

    fn max_keys(&self) -> usize {
        2 * self.t - 1
    }

    fn page(&self, id: PageId) -> &Page<K, V> {
        self.pages[id.0].as_ref().expect("dangling PageId")
    }

    fn page_mut(&mut self, id: PageId) -> &mut Page<K, V> {
        self.pages[id.0].as_mut().expect("dangling PageId")
    }

    fn is_leaf(&self, id: PageId) -> bool {
        self.page(id).children.is_empty()
    }

    fn alloc_page(&mut self, page: Page<K, V>) -> PageId {
        if let Some(i) = self.free.pop() {
            self.pages[i] = Some(page);
            PageId(i)
        } else {
            self.pages.push(Some(page));
            PageId(self.pages.len() - 1)
        }
    }

    fn dealloc_page(&mut self, id: PageId) {
        self.pages[id.0] = None;
        self.free.push(id.0);
    }

    fn recompute_len_local(&mut self, id: PageId) {
        let page = self.page(id);
        let sum: usize = page
            .children
            .iter()
            .map(|c| self.page(*c).subtree_len)
            .sum();
        let n = self.page(id).keys.len();
        self.page_mut(id).subtree_len = n + sum;
    }

    // Walks from `id` to the root, recomputing `subtree_len` at every ancestor. Everything
    // touched by a split, merge, or borrow lies on this path, so one bottom-up pass after the
    // operation finishes is enough to repair every size.
    fn refresh_sizes(&mut self, mut id: PageId) {
        loop {
            self.recompute_len_local(id);
            match self.page(id).parent {
                Some(p) => id = p,
                None => break,
            }
        }
    }

    fn find_pos(&self, key: &K) -> Option<(PageId, usize)> {
        let mut cur = self.root;
        loop {
            let page = self.page(cur);
            match page.keys.binary_search(key) {
                Ok(i) => return Some((cur, i)),
                Err(i) => {
                    if page.children.is_empty() {
                        return None;
                    }
                    cur = page.children[i];
                }
            }
        }
    }

    /// Returns a reference to the value associated with `key`.
    pub fn search(&self, key: &K) -> Option<&V> {
        let (id, i) = self.find_pos(key)?;
        Some(&self.page(id).vals[i])
    }

    /// Does this tree contain `key`?
    pub fn contains(&self, key: &K) -> bool {
        self.find_pos(key).is_some()
    }

    /// Inserts `key`/`value`. Replaces and returns the old value if `key` was already present.
    pub fn insert(&mut self, key: K, val: V) -> Option<V> {
        if self.page(self.root).keys.len() == self.max_keys() {
            let old_root = self.root;
            let mut new_root = Page::leaf();
            new_root.children.push(old_root);
            let new_root_id = self.alloc_page(new_root);
            self.page_mut(old_root).parent = Some(new_root_id);
            self.root = new_root_id;
            self.split_child(new_root_id, 0);
        }
        let result = self.insert_nonfull(self.root, key, val);
        if result.is_none() {
            self.len += 1;
        }
        debug_assert!(self.check());
        result
    }

    // Splits the full child at `parent.children[i]` in two, pushing its median key/value up into
    // `parent` at index `i`. `child` keeps the lower `t - 1` keys; a freshly allocated sibling
    // takes the upper `t - 1` keys (and, if internal, the upper `t` children).
    fn split_child(&mut self, parent: PageId, i: usize) {
        let t = self.t;
        let child = self.page(parent).children[i];
        let (mid_key, mid_val, sibling) = {
            let c = self.page_mut(child);
            let mid_key = c.keys.remove(t - 1);
            let mid_val = c.vals.remove(t - 1);
            let sib_keys = c.keys.split_off(t - 1);
            let sib_vals = c.vals.split_off(t - 1);
            let sib_children = if c.children.is_empty() {
                Vec::new()
            } else {
                c.children.split_off(t)
            };
            (
                mid_key,
                mid_val,
                Page {
                    keys: sib_keys,
                    vals: sib_vals,
                    children: sib_children,
                    parent: Some(parent),
                    subtree_len: 0,
                },
            )
        };
        let sib_id = self.alloc_page(sibling);
        let sib_children: Vec<PageId> = self.page(sib_id).children.clone();
        for c in sib_children {
            self.page_mut(c).parent = Some(sib_id);
        }
        self.page_mut(parent).children.insert(i + 1, sib_id);
        self.page_mut(parent).keys.insert(i, mid_key);
        self.page_mut(parent).vals.insert(i, mid_val);
        self.recompute_len_local(child);
        self.recompute_len_local(sib_id);
    }

    fn insert_nonfull(&mut self, id: PageId, key: K, val: V) -> Option<V> {
        match self.page(id).keys.binary_search(&key) {
            Ok(i) => {
                let old = std::mem::replace(&mut self.page_mut(id).vals[i], val);
                Some(old)
            }
            Err(i) => {
                if self.is_leaf(id) {
                    self.page_mut(id).keys.insert(i, key);
                    self.page_mut(id).vals.insert(i, val);
                    self.refresh_sizes(id);
                    None
                } else {
                    let mut child = self.page(id).children[i];
                    if self.page(child).keys.len() == self.max_keys() {
                        self.split_child(id, i);
                        match key.cmp(&self.page(id).keys[i]) {
                            Ordering::Greater => child = self.page(id).children[i + 1],
                            Ordering::Equal => {
                                let old = std::mem::replace(&mut self.page_mut(id).vals[i], val);
                                return Some(old);
                            }
                            Ordering::Less => {}
                        }
                    }
                    self.insert_nonfull(child, key, val)
                }
            }
        }
    }

    /// Removes `key`, returning its value, or `None` if absent.
    pub fn delete(&mut self, key: &K) -> Option<V> {
        let result = self.delete_inner(self.root, key);
        if !self.is_leaf(self.root) && self.page(self.root).keys.is_empty() {
            let old_root = self.root;
            let new_root = self.page(old_root).children[0];
            self.page_mut(new_root).parent = None;
            self.root = new_root;
            self.dealloc_page(old_root);
        }
        if result.is_some() {
            self.len -= 1;
        }
        debug_assert!(self.check());
        result
    }

    fn delete_inner(&mut self, id: PageId, key: &K) -> Option<V> {
        match self.page(id).keys.binary_search(key) {
            Ok(i) => {
                if self.is_leaf(id) {
                    self.page_mut(id).keys.remove(i);
                    let v = self.page_mut(id).vals.remove(i);
                    self.refresh_sizes(id);
                    Some(v)
                } else {
                    self.delete_internal_key(id, i)
                }
            }
            Err(i) => {
                if self.is_leaf(id) {
                    None
                } else {
                    self.ensure_child_can_lose_key(id, i);
                    // The borrow/merge above may have changed `id`'s key layout; relocate.
                    match self.page(id).keys.binary_search(key) {
                        Ok(fi) => self.delete_internal_key(id, fi),
                        Err(fi) => {
                            let child = self.page(id).children[fi];
                            self.delete_inner(child, key)
                        }
                    }
                }
            }
        }
    }

    // Deletes the key at index `i` of internal page `id`, following CLRS's case analysis:
    // replace with the predecessor (if the left child can spare a key), the successor (if the
    // right child can), or merge the two children around the key and recurse into the merge.
    fn delete_internal_key(&mut self, id: PageId, i: usize) -> Option<V> {
        let left = self.page(id).children[i];
        let right = self.page(id).children[i + 1];
        if self.page(left).keys.len() > self.min_keys() {
            let (pred_k, pred_v) = self.delete_max(left);
            let old_v = std::mem::replace(&mut self.page_mut(id).vals[i], pred_v);
            self.page_mut(id).keys[i] = pred_k;
            self.refresh_sizes(id);
            Some(old_v)
        } else if self.page(right).keys.len() > self.min_keys() {
            let (succ_k, succ_v) = self.delete_min(right);
            let old_v = std::mem::replace(&mut self.page_mut(id).vals[i], succ_v);
            self.page_mut(id).keys[i] = succ_k;
            self.refresh_sizes(id);
            Some(old_v)
        } else {
            let sep_idx = self.merge_children(id, i);
            let merged = self.page(id).children[i];
            if self.is_leaf(merged) {
                self.page_mut(merged).keys.remove(sep_idx);
                let v = self.page_mut(merged).vals.remove(sep_idx);
                self.refresh_sizes(merged);
                Some(v)
            } else {
                self.delete_internal_key(merged, sep_idx)
            }
        }
    }

    fn delete_max(&mut self, id: PageId) -> (K, V) {
        if self.is_leaf(id) {
            let k = self.page_mut(id).keys.pop().expect("leaf with no keys");
            let v = self.page_mut(id).vals.pop().expect("leaf with no keys");
            self.refresh_sizes(id);
            (k, v)
        } else {
            let last = self.page(id).children.len() - 1;
            let idx = self.ensure_child_can_lose_key(id, last);
            let child = self.page(id).children[idx];
            self.delete_max(child)
        }
    }

    fn delete_min(&mut self, id: PageId) -> (K, V) {
        if self.is_leaf(id) {
            let k = self.page_mut(id).keys.remove(0);
            let v = self.page_mut(id).vals.remove(0);
            self.refresh_sizes(id);
            (k, v)
        } else {
            let idx = self.ensure_child_can_lose_key(id, 0);
            let child = self.page(id).children[idx];
            self.delete_min(child)
        }
    }

    // Ensures `parent.children[i]` has more than the minimum key count before we descend into it,
    // borrowing a key from a sibling with spare capacity or merging with one otherwise. Returns
    // the index (into `parent`'s children) to actually descend into, which shifts left by one
    // when the child was merged into its left sibling.
    fn ensure_child_can_lose_key(&mut self, parent: PageId, i: usize) -> usize {
        if self.page(self.page(parent).children[i]).keys.len() > self.min_keys() {
            return i;
        }
        let num_children = self.page(parent).children.len();
        let has_left = i > 0;
        let has_right = i + 1 < num_children;
        let left_ok =
            has_left && self.page(self.page(parent).children[i - 1]).keys.len() > self.min_keys();
        let right_ok =
            has_right && self.page(self.page(parent).children[i + 1]).keys.len() > self.min_keys();
        if left_ok {
            self.borrow_from_left(parent, i);
            i
        } else if right_ok {
            self.borrow_from_right(parent, i);
            i
        } else if has_left {
            self.merge_children(parent, i - 1);
            i - 1
        } else {
            self.merge_children(parent, i);
            i
        }
    }

    fn borrow_from_left(&mut self, parent: PageId, i: usize) {
        let left_sib = self.page(parent).children[i - 1];
        let child = self.page(parent).children[i];
        let borrowed_key = self.page_mut(left_sib).keys.pop().expect("sibling had spare keys");
        let borrowed_val = self.page_mut(left_sib).vals.pop().expect("sibling had spare keys");
        let sep_key = std::mem::replace(&mut self.page_mut(parent).keys[i - 1], borrowed_key);
        let sep_val = std::mem::replace(&mut self.page_mut(parent).vals[i - 1], borrowed_val);
        self.page_mut(child).keys.insert(0, sep_key);
        self.page_mut(child).vals.insert(0, sep_val);
        if !self.page(left_sib).children.is_empty() {
            let moved = self.page_mut(left_sib).children.pop().unwrap();
            self.page_mut(moved).parent = Some(child);
            self.page_mut(child).children.insert(0, moved);
        }
        self.recompute_len_local(left_sib);
        self.recompute_len_local(child);
    }

    fn borrow_from_right(&mut self, parent: PageId, i: usize) {
        let right_sib = self.page(parent).children[i + 1];
        let child = self.page(parent).children[i];
        let borrowed_key = self.page_mut(right_sib).keys.remove(0);
        let borrowed_val = self.page_mut(right_sib).vals.remove(0);
        let sep_key = std::mem::replace(&mut self.page_mut(parent).keys[i], borrowed_key);
        let sep_val = std::mem::replace(&mut self.page_mut(parent).vals[i], borrowed_val);
        self.page_mut(child).keys.push(sep_key);
        self.page_mut(child).vals.push(sep_val);
        if !self.page(right_sib).children.is_empty() {
            let moved = self.page_mut(right_sib).children.remove(0);
            self.page_mut(moved).parent = Some(child);
            self.page_mut(child).children.push(moved);
        }
        self.recompute_len_local(right_sib);
        self.recompute_len_local(child);
    }

    // Merges `parent.children[i]` and `parent.children[i + 1]` around `parent.keys[i]`; the
    // result (keeping `children[i]`'s slot) holds the left child's keys, the separator, then the
    // right child's keys. Returns the index the separator now occupies in the merged page.
    fn merge_children(&mut self, parent: PageId, i: usize) -> usize {
        let left = self.page(parent).children[i];
        let right = self.page(parent).children[i + 1];
        let sep_key = self.page_mut(parent).keys.remove(i);
        let sep_val = self.page_mut(parent).vals.remove(i);
        self.page_mut(parent).children.remove(i + 1);
        let sep_idx = self.page(left).keys.len();
        let (mut r_keys, mut r_vals, mut r_children) = {
            let r = self.page_mut(right);
            (
                std::mem::take(&mut r.keys),
                std::mem::take(&mut r.vals),
                std::mem::take(&mut r.children),
            )
        };
        for c in &r_children {
            self.page_mut(*c).parent = Some(left);
        }
        let l = self.page_mut(left);
        l.keys.push(sep_key);
        l.vals.push(sep_val);
        l.keys.append(&mut r_keys);
        l.vals.append(&mut r_vals);
        l.children.append(&mut r_children);
        self.dealloc_page(right);
        self.recompute_len_local(left);
        sep_idx
    }

    fn subtree_min_pos(&self, mut id: PageId) -> (PageId, usize) {
        while !self.is_leaf(id) {
            id = self.page(id).children[0];
        }
        (id, 0)
    }

    fn subtree_max_pos(&self, mut id: PageId) -> (PageId, usize) {
        while !self.is_leaf(id) {
            id = *self.page(id).children.last().unwrap();
        }
        let last = self.page(id).keys.len() - 1;
        (id, last)
    }

    /// Returns the key-value pair with the smallest key.
    pub fn min(&self) -> Option<(&K, &V)> {
        if self.len == 0 {
            return None;
        }
        let (id, i) = self.subtree_min_pos(self.root);
        let p = self.page(id);
        Some((&p.keys[i], &p.vals[i]))
    }

    /// Returns the key-value pair with the largest key.
    pub fn max(&self) -> Option<(&K, &V)> {
        if self.len == 0 {
            return None;
        }
        let (id, i) = self.subtree_max_pos(self.root);
        let p = self.page(id);
        Some((&p.keys[i], &p.vals[i]))
    }

    fn successor_pos(&self, id: PageId, i: usize) -> Option<(PageId, usize)> {
        let page = self.page(id);
        if !page.children.is_empty() {
            return Some(self.subtree_min_pos(page.children[i + 1]));
        }
        if i + 1 < page.keys.len() {
            return Some((id, i + 1));
        }
        let mut cur = id;
        loop {
            let parent = self.page(cur).parent?;
            let siblings = &self.page(parent).children;
            let pos = siblings.iter().position(|&c| c == cur).unwrap();
            if pos < self.page(parent).keys.len() {
                return Some((parent, pos));
            }
            cur = parent;
        }
    }

    fn predecessor_pos(&self, id: PageId, i: usize) -> Option<(PageId, usize)> {
        let page = self.page(id);
        if !page.children.is_empty() {
            return Some(self.subtree_max_pos(page.children[i]));
        }
        if i > 0 {
            return Some((id, i - 1));
        }
        let mut cur = id;
        loop {
            let parent = self.page(cur).parent?;
            let siblings = &self.page(parent).children;
            let pos = siblings.iter().position(|&c| c == cur).unwrap();
            if pos > 0 {
                return Some((parent, pos - 1));
            }
            cur = parent;
        }
    }

    /// Returns the key-value pair immediately before `key` in sorted order.
    pub fn predecessor(&self, key: &K) -> Option<(&K, &V)> {
        let (id, i) = self.find_pos(key)?;
        let (pid, pi) = self.predecessor_pos(id, i)?;
        let p = self.page(pid);
        Some((&p.keys[pi], &p.vals[pi]))
    }

    /// Returns the key-value pair immediately after `key` in sorted order.
    pub fn successor(&self, key: &K) -> Option<(&K, &V)> {
        let (id, i) = self.find_pos(key)?;
        let (sid, si) = self.successor_pos(id, i)?;
        let p = self.page(sid);
        Some((&p.keys[si], &p.vals[si]))
    }

    /// Returns the key-value pair with 0-indexed in-order rank `i`, generalizing spec.md §4.3's
    /// `select_by_rank` descent to multiway pages via each child's `subtree_len`.
    pub fn select_by_rank(&self, mut i: usize) -> Option<(&K, &V)> {
        if i >= self.len {
            return None;
        }
        let mut cur = self.root;
        loop {
            let page = self.page(cur);
            if page.children.is_empty() {
                return Some((&page.keys[i], &page.vals[i]));
            }
            let mut acc = 0usize;
            let mut descend = None;
            for c in 0..page.keys.len() {
                let child_len = self.page(page.children[c]).subtree_len;
                if i < acc + child_len {
                    descend = Some((page.children[c], i - acc));
                    break;
                }
                acc += child_len;
                if i == acc {
                    return Some((&page.keys[c], &page.vals[c]));
                }
                acc += 1;
            }
            match descend {
                Some((child, rem)) => {
                    cur = child;
                    i = rem;
                }
                None => {
                    let last_child = *page.children.last().unwrap();
                    i -= acc;
                    cur = last_child;
                }
            }
        }
    }

    fn ceiling_pos(&self, lo: &K) -> Option<(PageId, usize)> {
        let mut cur = self.root;
        let mut best = None;
        loop {
            let page = self.page(cur);
            match page.keys.binary_search(lo) {
                Ok(i) => return Some((cur, i)),
                Err(i) => {
                    if i < page.keys.len() {
                        best = Some((cur, i));
                    }
                    if page.children.is_empty() {
                        return best;
                    }
                    cur = page.children[i];
                }
            }
        }
    }

    /// Returns every key-value pair with key in `[lo, hi]`, in ascending order.
    pub fn range_query(&self, lo: &K, hi: &K) -> Vec<(&K, &V)> {
        let mut out = Vec::new();
        let mut cur = self.ceiling_pos(lo);
        while let Some((id, i)) = cur {
            let page = self.page(id);
            if &page.keys[i] > hi {
                break;
            }
            out.push((&page.keys[i], &page.vals[i]));
            cur = self.successor_pos(id, i);
        }
        out
    }

    /// Returns an in-order iterator (ascending key order).
    pub fn iter_in_order(&self) -> InOrderIter<'_, K, V> {
        InOrderIter {
            tree: self,
            cur: if self.len == 0 {
                None
            } else {
                Some(self.subtree_min_pos(self.root))
            },
        }
    }

    fn preorder_next_page(&self, page: PageId) -> Option<PageId> {
        if !self.page(page).children.is_empty() {
            return Some(self.page(page).children[0]);
        }
        let mut cur = page;
        loop {
            let parent = self.page(cur).parent?;
            let siblings = &self.page(parent).children;
            let pos = siblings.iter().position(|&c| c == cur).unwrap();
            if pos + 1 < siblings.len() {
                return Some(siblings[pos + 1]);
            }
            cur = parent;
        }
    }

    fn postorder_first_page(&self, mut page: PageId) -> PageId {
        while !self.is_leaf(page) {
            page = self.page(page).children[0];
        }
        page
    }

    fn postorder_next_page(&self, page: PageId) -> Option<PageId> {
        let parent = self.page(page).parent?;
        let siblings = &self.page(parent).children;
        let pos = siblings.iter().position(|&c| c == page).unwrap();
        if pos + 1 < siblings.len() {
            Some(self.postorder_first_page(siblings[pos + 1]))
        } else {
            Some(parent)
        }
    }

    /// Returns a pre-order iterator: a page's own keys, then each child subtree left to right.
    pub fn iter_pre_order(&self) -> PreOrderIter<'_, K, V> {
        PreOrderIter {
            tree: self,
            cur: if self.len == 0 {
                None
            } else {
                Some((self.root, 0))
            },
        }
    }

    /// Returns a post-order iterator: each child subtree left to right, then a page's own keys.
    pub fn iter_post_order(&self) -> PostOrderIter<'_, K, V> {
        PostOrderIter {
            tree: self,
            cur: if self.len == 0 {
                None
            } else {
                Some((self.postorder_first_page(self.root), 0))
            },
        }
    }

    /// Debug invariant: BST ordering, page key-count bounds (`t - 1..=2t - 1`, root exempt from
    /// the lower bound), uniform leaf depth, parent-pointer coherence, and `subtree_len`
    /// consistency.
    pub fn check(&self) -> bool {
        if self.len == 0 {
            return self.page(self.root).keys.is_empty() && self.is_leaf(self.root);
        }
        let mut leaf_depth = None;
        self.check_node(self.root, None, None, true, &mut leaf_depth, 0)
    }

    fn check_node(
        &self,
        id: PageId,
        lo: Option<&K>,
        hi: Option<&K>,
        is_root: bool,
        leaf_depth: &mut Option<usize>,
        depth: usize,
    ) -> bool {
        let page = self.page(id);
        for w in page.keys.windows(2) {
            if w[0] >= w[1] {
                return false;
            }
        }
        if let (Some(lo), Some(k0)) = (lo, page.keys.first()) {
            if k0 <= lo {
                return false;
            }
        }
        if let (Some(hi), Some(kl)) = (hi, page.keys.last()) {
            if kl >= hi {
                return false;
            }
        }
        let min_keys = if is_root { 0 } else { self.min_keys() };
        if page.keys.len() < min_keys || page.keys.len() > self.max_keys() {
            return false;
        }
        if page.children.is_empty() {
            match *leaf_depth {
                None => *leaf_depth = Some(depth),
                Some(d) if d != depth => return false,
                _ => {}
            }
        } else {
            if page.children.len() != page.keys.len() + 1 {
                return false;
            }
            for (c, child) in page.children.iter().enumerate() {
                if self.page(*child).parent != Some(id) {
                    return false;
                }
                let child_lo = if c == 0 { lo } else { Some(&page.keys[c - 1]) };
                let child_hi = if c == page.keys.len() {
                    hi
                } else {
                    Some(&page.keys[c])
                };
                if !self.check_node(*child, child_lo, child_hi, false, leaf_depth, depth + 1) {
                    return false;
                }
            }
        }
        let expected: usize = page.keys.len()
            + page
                .children
                .iter()
                .map(|c| self.page(*c).subtree_len)
                .sum::<usize>();
        page.subtree_len == expected
    }
}

pub struct InOrderIter<'a, K, V> {
    tree: &'a BTree<K, V>,
    cur: Option<(PageId, usize)>,
}

impl<'a, K: Ord, V> Iterator for InOrderIter<'a, K, V> {
    type Item = (&'a K, &'a V);
    fn next(&mut self) -> Option<Self::Item> {
        let (id, i) = self.cur?;
        self.cur = self.tree.successor_pos(id, i);
        let p = self.tree.page(id);
        Some((&p.keys[i], &p.vals[i]))
    }
}

pub struct PreOrderIter<'a, K, V> {
    tree: &'a BTree<K, V>,
    cur: Option<(PageId, usize)>,
}

impl<'a, K: Ord, V> Iterator for PreOrderIter<'a, K, V> {
    type Item = (&'a K, &'a V);
    fn next(&mut self) -> Option<Self::Item> {
        let (id, i) = self.cur?;
        self.cur = self.tree.preorder_next(id, i);
        let p = self.tree.page(id);
        Some((&p.keys[i], &p.vals[i]))
    }
}

pub struct PostOrderIter<'a, K, V> {
    tree: &'a BTree<K, V>,
    cur: Option<(PageId, usize)>,
}

impl<'a, K: Ord, V> Iterator for PostOrderIter<'a, K, V> {
    type Item = (&'a K, &'a V);
    fn next(&mut self) -> Option<Self::Item> {
        let (id, i) = self.cur?;
        self.cur = self.tree.postorder_next(id, i);
        let p = self.tree.page(id);
        Some((&p.keys[i], &p.vals[i]))
    }
}

impl<K: Ord, V> BTree<K, V> {
    fn preorder_next(&self, page: PageId, idx: usize) -> Option<(PageId, usize)> {
        if idx + 1 < self.page(page).keys.len() {
            return Some((page, idx + 1));
        }
        self.preorder_next_page(page).map(|p| (p, 0))
    }

    fn postorder_next(&self, page: PageId, idx: usize) -> Option<(PageId, usize)> {
        if idx + 1 < self.page(page).keys.len() {
            return Some((page, idx + 1));
        }
        self.postorder_next_page(page).map(|p| (p, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_existing_value() {
        let mut t = BTree::new(2);
        t.insert(1, "a");
        assert_eq!(t.insert(1, "b"), Some("a"));
        assert_eq!(t.search(&1), Some(&"b"));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn splits_root_and_stays_balanced_on_large_sequential_insert() {
        let mut t = BTree::new(2); // t=2: pages hold 1..=3 keys
        for i in 0..500 {
            t.insert(i, i * 10);
            assert!(t.check());
        }
        assert_eq!(t.len(), 500);
        for i in 0..500 {
            assert_eq!(t.search(&i), Some(&(i * 10)));
        }
        assert_eq!(t.min().map(|(k, _)| *k), Some(0));
        assert_eq!(t.max().map(|(k, _)| *k), Some(499));
    }

    #[test]
    fn delete_maintains_invariants_under_many_removals() {
        let mut t = BTree::new(3);
        for i in 0..300 {
            t.insert(i, i);
        }
        for i in (0..300).step_by(2) {
            assert_eq!(t.delete(&i), Some(i));
            assert!(t.check());
        }
        for i in 0..300 {
            if i % 2 == 0 {
                assert_eq!(t.search(&i), None);
            } else {
                assert_eq!(t.search(&i), Some(&i));
            }
        }
    }

    #[test]
    fn delete_absent_key_is_a_no_op() {
        let mut t = BTree::new(2);
        t.insert(1, "a");
        assert_eq!(t.delete(&99), None);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn order_statistics_on_one_through_fifty() {
        let mut t = BTree::new(2);
        for i in 1..=50 {
            t.insert(i, i.to_string());
        }
        assert!(t.check());
        assert_eq!(t.select_by_rank(0).map(|(k, _)| *k), Some(1));
        assert_eq!(t.select_by_rank(49).map(|(k, _)| *k), Some(50));
        assert_eq!(t.select_by_rank(24).map(|(k, _)| *k), Some(25));
        let in_order: Vec<i32> = t.iter_in_order().map(|(k, _)| *k).collect();
        assert_eq!(in_order, (1..=50).collect::<Vec<_>>());
    }

    #[test]
    fn range_query_and_predecessor_successor() {
        let mut t = BTree::new(2);
        for i in [5, 3, 8, 1, 4, 7, 9, 2, 6] {
            t.insert(i, i);
        }
        let range: Vec<i32> = t.range_query(&3, &7).iter().map(|(k, _)| **k).collect();
        assert_eq!(range, vec![3, 4, 5, 6, 7]);
        assert_eq!(t.predecessor(&5).map(|(k, _)| *k), Some(4));
        assert_eq!(t.successor(&5).map(|(k, _)| *k), Some(6));
        assert_eq!(t.predecessor(&1), None);
        assert_eq!(t.successor(&9), None);
    }

    #[test]
    fn pre_and_post_order_visit_every_key_exactly_once() {
        let mut t = BTree::new(2);
        for i in 1..=40 {
            t.insert(i, i);
        }
        let mut pre: Vec<i32> = t.iter_pre_order().map(|(k, _)| *k).collect();
        pre.sort_unstable();
        assert_eq!(pre, (1..=40).collect::<Vec<_>>());
        let mut post: Vec<i32> = t.iter_post_order().map(|(k, _)| *k).collect();
        post.sort_unstable();
        assert_eq!(post, (1..=40).collect::<Vec<_>>());
    }
}
