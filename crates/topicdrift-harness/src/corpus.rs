//! Topic corpus read from a directory tree.
//!
//! Layout: `<root>/<topic>/<document>`. Every non-hidden subdirectory of the
//! root is a topic and every regular file inside it is one document. Topics
//! are enumerated in name order so that a seeded run is reproducible across
//! filesystems.

use std::fs;
use std::path::{Path, PathBuf};

use topicdrift_core::{TopicDocuments, TopicSource};

use crate::error::{HarnessError, Result};

#[derive(Debug, Clone)]
pub struct Corpus {
    root: PathBuf,
    topics: Vec<TopicDocuments<PathBuf>>,
}

impl Corpus {
    pub fn read_dir(root: &Path) -> Result<Self> {
        let mut topic_dirs: Vec<(String, PathBuf)> = Vec::new();
        for entry in fs::read_dir(root)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_hidden(&name) || !entry.file_type()?.is_dir() {
                continue;
            }
            topic_dirs.push((name, entry.path()));
        }
        if topic_dirs.is_empty() {
            return Err(HarnessError::EmptyCorpus(root.to_path_buf()));
        }
        topic_dirs.sort_by(|a, b| a.0.cmp(&b.0));

        let mut topics = Vec::with_capacity(topic_dirs.len());
        for (name, dir) in topic_dirs {
            topics.push(TopicDocuments::new(name, read_documents(&dir)?));
        }
        Ok(Self {
            root: root.to_path_buf(),
            topics,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn topics(&self) -> &[TopicDocuments<PathBuf>] {
        &self.topics
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    #[must_use]
    pub fn topic_names(&self) -> Vec<String> {
        self.topics.iter().map(|t| t.name.clone()).collect()
    }

    #[must_use]
    pub fn document_count(&self) -> usize {
        self.topics.iter().map(|t| t.documents.len()).sum()
    }
}

impl TopicSource for Corpus {
    type Document = PathBuf;

    fn into_topics(self) -> Vec<TopicDocuments<PathBuf>> {
        self.topics
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn read_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            documents.push(entry.path());
        }
    }
    documents.sort();
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_tmp_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after UNIX_EPOCH")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("{prefix}-{}-{nanos}", std::process::id()));
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn topics_are_sorted_and_hidden_entries_skipped() {
        let root = unique_tmp_dir("corpus-sorted");
        for (topic, docs) in [("sports", 2), ("arts", 3), (".cache", 4)] {
            let dir = root.join(topic);
            fs::create_dir_all(&dir).unwrap();
            for d in 0..docs {
                fs::write(dir.join(format!("doc-{d}.txt")), "text").unwrap();
            }
        }
        fs::write(root.join("README"), "not a topic").unwrap();
        fs::create_dir_all(root.join("arts").join("nested")).unwrap();

        let corpus = Corpus::read_dir(&root).unwrap();
        assert_eq!(corpus.topic_names(), vec!["arts", "sports"]);
        assert_eq!(corpus.document_count(), 5);
        assert!(corpus.topics()[0].documents.iter().all(|p| p.is_file()));

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn empty_root_is_rejected() {
        let root = unique_tmp_dir("corpus-empty");
        assert!(matches!(
            Corpus::read_dir(&root),
            Err(HarnessError::EmptyCorpus(_))
        ));
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn missing_root_is_an_io_error() {
        let root = std::env::temp_dir().join("corpus-does-not-exist-7f3a");
        assert!(matches!(Corpus::read_dir(&root), Err(HarnessError::Io(_))));
    }
}
