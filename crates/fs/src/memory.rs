//! In-memory [`FileSystemProvider`] for exercising session logic without
//! touching disk.
//!
//! Every call is recorded, failures can be injected per operation, and
//! mutations under the watched directory queue the [`WatchEvent`]s a real
//! watcher would report. Tests drain them with [`MemoryProvider::take_events`].

use std::{
    collections::{BTreeMap, HashSet},
    sync::{Mutex, MutexGuard, PoisonError},
};

use explite_protocol::{UndeleteItem, WatchEvent};

use crate::{
    error::{ProviderError, Result},
    mime,
    path::{basename, dirname, is_within, join},
    provider::FileSystemProvider,
    record::{Dirent, FileAttribute, RecycleBinItem, Volume},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: &'static str,
    pub args: Vec<String>,
}

#[derive(Debug, Clone)]
struct Node {
    is_dir: bool,
    size: u64,
    time_ms: i64,
    hidden: bool,
    system: bool,
    link_target: Option<String>,
}

#[derive(Debug, Clone)]
struct Trashed {
    original_path: String,
    deleted_ms: i64,
    /// Node and its descendants, keyed relative to the original path.
    nodes: Vec<(String, Node)>,
}

#[derive(Default)]
struct State {
    nodes: BTreeMap<String, Node>,
    trash: Vec<Trashed>,
    calls: Vec<Call>,
    failures: HashSet<&'static str>,
    watched: Option<(String, bool)>,
    events: Vec<WatchEvent>,
    volumes: Vec<Volume>,
    clock: i64,
}

#[derive(Default)]
pub struct MemoryProvider {
    state: Mutex<State>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a directory and any missing ancestors.
    pub fn add_dir(&self, path: &str) -> &Self {
        let mut st = self.lock();
        st.ensure_dirs(path);
        self
    }

    pub fn add_file(&self, path: &str, size: u64) -> &Self {
        let mut st = self.lock();
        st.ensure_dirs(&dirname(path));
        let node = st.node(false, size);
        st.nodes.insert(path.to_string(), node);
        self
    }

    pub fn add_hidden_file(&self, path: &str) -> &Self {
        self.add_file(path, 0);
        if let Some(n) = self.lock().nodes.get_mut(path) {
            n.hidden = true;
        }
        self
    }

    /// A node providers flag as system (e.g. a socket).
    pub fn add_system_file(&self, path: &str) -> &Self {
        self.add_file(path, 0);
        if let Some(n) = self.lock().nodes.get_mut(path) {
            n.system = true;
        }
        self
    }

    pub fn add_symlink(&self, path: &str, target: &str) -> &Self {
        let mut st = self.lock();
        st.ensure_dirs(&dirname(path));
        let mut node = st.node(false, 0);
        node.link_target = Some(target.to_string());
        st.nodes.insert(path.to_string(), node);
        self
    }

    /// Override the timestamp reported for `path`.
    pub fn set_time(&self, path: &str, time_ms: i64) -> &Self {
        if let Some(n) = self.lock().nodes.get_mut(path) {
            n.time_ms = time_ms;
        }
        self
    }

    pub fn set_volumes(&self, volumes: Vec<Volume>) -> &Self {
        self.lock().volumes = volumes;
        self
    }

    /// Make every later call of `op` fail.
    pub fn fail(&self, op: &'static str) -> &Self {
        self.lock().failures.insert(op);
        self
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Calls of `op`, optionally only those whose first argument is `arg0`.
    pub fn count(&self, op: &str, arg0: Option<&str>) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.op == op)
            .filter(|c| arg0.is_none_or(|a| c.args.first().map(String::as_str) == Some(a)))
            .count()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn take_events(&self) -> Vec<WatchEvent> {
        std::mem::take(&mut self.lock().events)
    }

    pub fn watched(&self) -> Option<(String, bool)> {
        self.lock().watched.clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.lock().nodes.keys().cloned().collect()
    }

    fn begin(&self, op: &'static str, args: &[&str]) -> Result<MutexGuard<'_, State>> {
        let mut st = self.lock();
        st.calls.push(Call {
            op,
            args: args.iter().map(|a| a.to_string()).collect(),
        });
        if st.failures.contains(op) {
            return Err(ProviderError::Failed {
                op,
                path: args.first().map(|a| a.to_string()).unwrap_or_default(),
            });
        }
        Ok(st)
    }
}

impl State {
    fn tick(&mut self) -> i64 {
        self.clock += 1000;
        self.clock
    }

    fn node(&mut self, is_dir: bool, size: u64) -> Node {
        Node {
            is_dir,
            size,
            time_ms: self.tick(),
            hidden: false,
            system: false,
            link_target: None,
        }
    }

    fn ensure_dirs(&mut self, path: &str) {
        let mut cur = path.to_string();
        let mut missing = Vec::new();
        while !cur.is_empty() && !self.nodes.contains_key(&cur) {
            missing.push(cur.clone());
            let parent = dirname(&cur);
            if parent == cur {
                break;
            }
            cur = parent;
        }
        for dir in missing.into_iter().rev() {
            let node = self.node(true, 0);
            self.nodes.insert(dir, node);
        }
    }

    fn exists(&self, path: &str) -> bool {
        self.nodes.contains_key(path)
    }

    fn require(&self, path: &str) -> Result<&Node> {
        self.nodes
            .get(path)
            .ok_or_else(|| ProviderError::NotFound(path.to_string()))
    }

    fn require_dir(&self, path: &str) -> Result<()> {
        match self.nodes.get(path) {
            Some(n) if n.is_dir => Ok(()),
            _ => Err(ProviderError::NotFound(path.to_string())),
        }
    }

    /// `path` and all of its descendants.
    fn subtree(&self, path: &str) -> Vec<String> {
        self.nodes
            .keys()
            .filter(|k| is_within(k, path))
            .cloned()
            .collect()
    }

    fn detach(&mut self, path: &str) -> Vec<(String, Node)> {
        let prefix_len = path.len();
        self.subtree(path)
            .into_iter()
            .filter_map(|k| {
                let node = self.nodes.remove(&k)?;
                Some((k[prefix_len..].to_string(), node))
            })
            .collect()
    }

    fn attach(&mut self, path: &str, nodes: Vec<(String, Node)>) {
        for (rel, node) in nodes {
            self.nodes.insert(format!("{path}{rel}"), node);
        }
    }

    fn attributes(&self, path: &str, node: &Node) -> FileAttribute {
        let target = node
            .link_target
            .as_ref()
            .and_then(|t| self.nodes.get(t));
        let effective = target.unwrap_or(node);
        let name = basename(path);

        FileAttribute {
            is_directory: effective.is_dir,
            is_file: !effective.is_dir && (node.link_target.is_none() || target.is_some()),
            is_hidden: node.hidden || name.starts_with('.'),
            is_symbolic_link: node.link_target.is_some(),
            is_system: node.system,
            atime_ms: effective.time_ms,
            ctime_ms: effective.time_ms,
            mtime_ms: effective.time_ms,
            birthtime_ms: effective.time_ms,
            size: if effective.is_dir { 0 } else { effective.size },
            link_path: node.link_target.clone().unwrap_or_default(),
            ..FileAttribute::default()
        }
    }

    fn dirent(&self, path: &str, node: &Node) -> Dirent {
        let attributes = self.attributes(path, node);
        Dirent {
            name: basename(path),
            parent_path: dirname(path),
            full_path: path.to_string(),
            mime_type: mime_for(path, &attributes),
            attributes,
        }
    }

    /// Whether the active watch would report a change at `path`.
    fn observes(&self, path: &str) -> bool {
        match &self.watched {
            Some((dir, true)) => is_within(path, dir) && path != dir,
            Some((dir, false)) => dirname(path) == *dir,
            None => false,
        }
    }

    fn notify_create(&mut self, paths: &[String]) {
        let seen: Vec<String> = paths.iter().filter(|p| self.observes(p)).cloned().collect();
        if !seen.is_empty() {
            self.events.push(WatchEvent::create(seen));
        }
    }

    fn notify_remove(&mut self, paths: &[String]) {
        let seen: Vec<String> = paths.iter().filter(|p| self.observes(p)).cloned().collect();
        if !seen.is_empty() {
            self.events.push(WatchEvent::remove(seen));
        }
    }

    fn notify_rename(&mut self, from: &str, to: &str) {
        match (self.observes(from), self.observes(to)) {
            (true, true) => self
                .events
                .push(WatchEvent::rename(from.to_string(), to.to_string())),
            (true, false) => self.notify_remove(&[from.to_string()]),
            (false, true) => self.notify_create(&[to.to_string()]),
            (false, false) => {}
        }
    }

    fn find_trashed(&self, pred: impl Fn(&Trashed) -> bool, missing: &str) -> Result<usize> {
        // Latest deletion wins.
        self.trash
            .iter()
            .enumerate()
            .filter(|(_, t)| pred(t))
            .max_by_key(|(_, t)| t.deleted_ms)
            .map(|(i, _)| i)
            .ok_or_else(|| ProviderError::NotFound(missing.to_string()))
    }

    fn restore(&mut self, idx: usize) -> Result<()> {
        let path = self.trash[idx].original_path.clone();
        if self.exists(&path) {
            return Err(ProviderError::AlreadyExists(path));
        }
        let item = self.trash.remove(idx);
        self.ensure_dirs(&dirname(&path));
        self.attach(&path, item.nodes);
        self.notify_create(&[path]);
        Ok(())
    }
}

fn mime_for(path: &str, attributes: &FileAttribute) -> String {
    if attributes.is_directory {
        String::new()
    } else {
        mime::guess(path).to_string()
    }
}

fn trash_path(t: &Trashed) -> String {
    format!("trash:{}:{}", t.deleted_ms, t.original_path)
}

impl FileSystemProvider for MemoryProvider {
    fn readdir(&self, dir: &str, recursive: bool) -> Result<Vec<Dirent>> {
        let st = self.begin("readdir", &[dir, if recursive { "recursive" } else { "flat" }])?;
        st.require_dir(dir)?;

        Ok(st
            .nodes
            .iter()
            .filter(|(k, _)| {
                if recursive {
                    is_within(k, dir) && k.as_str() != dir
                } else {
                    dirname(k) == dir
                }
            })
            .map(|(k, n)| st.dirent(k, n))
            .collect())
    }

    fn stat(&self, path: &str) -> Result<FileAttribute> {
        let st = self.begin("stat", &[path])?;
        let node = st.require(path)?;
        Ok(st.attributes(path, node))
    }

    fn mime_type(&self, path: &str) -> Result<String> {
        let st = self.begin("mime_type", &[path])?;
        let node = st.require(path)?;
        Ok(mime_for(path, &st.attributes(path, node)))
    }

    fn exists(&self, path: &str) -> bool {
        let mut st = self.lock();
        st.calls.push(Call {
            op: "exists",
            args: vec![path.to_string()],
        });
        st.exists(path)
    }

    fn rename(&self, old_path: &str, new_path: &str) -> Result<()> {
        let mut st = self.begin("rename", &[old_path, new_path])?;
        st.require(old_path)?;
        if st.exists(new_path) {
            return Err(ProviderError::AlreadyExists(new_path.to_string()));
        }
        let nodes = st.detach(old_path);
        st.attach(new_path, nodes);
        st.notify_rename(old_path, new_path);
        Ok(())
    }

    fn mkdir(&self, path: &str) -> Result<()> {
        let mut st = self.begin("mkdir", &[path])?;
        if st.exists(path) {
            return Err(ProviderError::AlreadyExists(path.to_string()));
        }
        st.require_dir(&dirname(path))?;
        let node = st.node(true, 0);
        st.nodes.insert(path.to_string(), node);
        st.notify_create(&[path.to_string()]);
        Ok(())
    }

    fn mkdir_all(&self, path: &str) -> Result<()> {
        let mut st = self.begin("mkdir_all", &[path])?;
        if !st.exists(path) {
            st.ensure_dirs(path);
            st.notify_create(&[path.to_string()]);
        }
        Ok(())
    }

    fn create(&self, path: &str) -> Result<()> {
        let mut st = self.begin("create", &[path])?;
        if st.exists(path) {
            return Err(ProviderError::AlreadyExists(path.to_string()));
        }
        st.require_dir(&dirname(path))?;
        let node = st.node(false, 0);
        st.nodes.insert(path.to_string(), node);
        st.notify_create(&[path.to_string()]);
        Ok(())
    }

    fn copy(&self, from: &[String], to: &str) -> Result<()> {
        let mut args: Vec<&str> = from.iter().map(String::as_str).collect();
        args.push(to);
        let mut st = self.begin("copy", &args)?;
        st.require_dir(to)?;

        let mut created = Vec::new();
        for src in from {
            st.require(src)?;
            if is_within(to, src) {
                return Err(ProviderError::InvalidInput(format!(
                    "cannot place \"{src}\" inside itself"
                )));
            }
            let dest = join(&[to, basename(src).as_str()]);
            if dest == *src {
                return Err(ProviderError::AlreadyExists(dest));
            }
            st.detach(&dest);
            let prefix_len = src.len();
            let copies: Vec<(String, Node)> = st
                .subtree(src)
                .into_iter()
                .filter_map(|k| {
                    let node = st.nodes.get(&k)?.clone();
                    Some((k[prefix_len..].to_string(), node))
                })
                .collect();
            st.attach(&dest, copies);
            created.push(dest);
        }
        st.notify_create(&created);
        Ok(())
    }

    fn move_items(&self, from: &[String], to: &str) -> Result<()> {
        let mut args: Vec<&str> = from.iter().map(String::as_str).collect();
        args.push(to);
        let mut st = self.begin("move_items", &args)?;
        st.require_dir(to)?;

        for src in from {
            st.require(src)?;
            if is_within(to, src) {
                return Err(ProviderError::InvalidInput(format!(
                    "cannot place \"{src}\" inside itself"
                )));
            }
            let dest = join(&[to, basename(src).as_str()]);
            if dest == *src {
                return Err(ProviderError::AlreadyExists(dest));
            }
            st.detach(&dest);
            let nodes = st.detach(src);
            st.attach(&dest, nodes);
            st.notify_rename(src, &dest);
        }
        Ok(())
    }

    fn trash(&self, paths: &[String]) -> Result<()> {
        let args: Vec<&str> = paths.iter().map(String::as_str).collect();
        let mut st = self.begin("trash", &args)?;

        for p in paths {
            st.require(p)?;
            let deleted_ms = st.tick();
            let nodes = st.detach(p);
            st.trash.push(Trashed {
                original_path: p.clone(),
                deleted_ms,
                nodes,
            });
        }
        st.notify_remove(paths);
        Ok(())
    }

    fn delete(&self, paths: &[String]) -> Result<()> {
        let args: Vec<&str> = paths.iter().map(String::as_str).collect();
        let mut st = self.begin("delete", &args)?;

        for p in paths {
            st.require(p)?;
            st.detach(p);
        }
        st.notify_remove(paths);
        Ok(())
    }

    fn undelete(&self, original_paths: &[String]) -> Result<()> {
        let args: Vec<&str> = original_paths.iter().map(String::as_str).collect();
        let mut st = self.begin("undelete", &args)?;

        for p in original_paths {
            let idx = st.find_trashed(|t| &t.original_path == p, p)?;
            st.restore(idx)?;
        }
        Ok(())
    }

    fn undelete_by_time(&self, items: &[UndeleteItem]) -> Result<()> {
        let args: Vec<&str> = items.iter().map(|i| i.original_path.as_str()).collect();
        let mut st = self.begin("undelete_by_time", &args)?;

        for item in items {
            let idx = st.find_trashed(
                |t| t.original_path == item.original_path && t.deleted_ms == item.deleted_time_ms,
                &item.original_path,
            )?;
            st.restore(idx)?;
        }
        Ok(())
    }

    fn delete_from_recycle_bin(&self, items: &[UndeleteItem]) -> Result<()> {
        let args: Vec<&str> = items.iter().map(|i| i.original_path.as_str()).collect();
        let mut st = self.begin("delete_from_recycle_bin", &args)?;

        for item in items {
            let idx = st.find_trashed(
                |t| t.original_path == item.original_path && t.deleted_ms == item.deleted_time_ms,
                &item.original_path,
            )?;
            st.trash.remove(idx);
        }
        Ok(())
    }

    fn read_recycle_bin(&self) -> Result<Vec<RecycleBinItem>> {
        let st = self.begin("read_recycle_bin", &[])?;

        Ok(st
            .trash
            .iter()
            .filter_map(|t| {
                let (_, root) = t.nodes.iter().find(|(rel, _)| rel.is_empty())?;
                let attributes = st.attributes(&t.original_path, root);
                Some(RecycleBinItem {
                    name: basename(&t.original_path),
                    full_path: trash_path(t),
                    original_path: t.original_path.clone(),
                    deleted_date_ms: t.deleted_ms,
                    mime_type: mime_for(&t.original_path, &attributes),
                    attributes,
                })
            })
            .collect())
    }

    fn empty_recycle_bin(&self) -> Result<()> {
        let mut st = self.begin("empty_recycle_bin", &[])?;
        st.trash.clear();
        Ok(())
    }

    fn watch(&self, path: &str, recursive: bool) -> Result<()> {
        let mut st = self.begin("watch", &[path])?;
        st.watched = Some((path.to_string(), recursive));
        Ok(())
    }

    fn unwatch(&self, path: &str) -> Result<()> {
        let mut st = self.begin("unwatch", &[path])?;
        if st.watched.as_ref().is_some_and(|(p, _)| p == path) {
            st.watched = None;
        }
        Ok(())
    }

    fn list_volumes(&self) -> Result<Vec<Volume>> {
        let st = self.begin("list_volumes", &[])?;
        Ok(st.volumes.clone())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
