//! Configuration graph resolution
//!
//! Configuration documents reference each other through `child_config` and
//! `parent_config`. [`FileGraph::build`] discovers every referenced
//! document (local or remote) into an arena of vertices connected by
//! parent→child edges, [`FileGraph::validate`] checks the result forms a
//! single chain, and [`FileGraph::resolve`] folds the chain into one
//! [`Configuration`].

use std::collections::BTreeSet;
use std::time::Duration;

use lint_fs::{NormalizedPath, io};
use lint_rules::{ConfigValue, DecodeError};

use crate::configuration::{Configuration, ParseContext};
use crate::keys::ConfigKey;
use crate::remote::{DEFAULT_TIMEOUT, DEFAULT_TIMEOUT_IF_CACHED, RemoteConfigCache};
use crate::{Error, Result, WarningSession};

/// Where a document comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Source {
    /// Absolute, normalized local path
    Local(NormalizedPath),
    /// `http(s)://` URL, fetched on resolution
    Remote(String),
}

impl Source {
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{path}"),
            Self::Remote(url) => write!(f, "{url}"),
        }
    }
}

/// One configuration document in the graph.
#[derive(Debug, Clone)]
pub struct Vertex {
    pub source: Source,
    /// Directory that relative references inside the document resolve against
    pub root_directory: NormalizedPath,
    pub is_initial: bool,
    /// Parsed document; `None` until the vertex is resolved
    pub document: Option<ConfigValue>,
    remote_timeout: Duration,
    remote_timeout_if_cached: Duration,
}

impl Vertex {
    fn new(source: Source, root_directory: NormalizedPath, is_initial: bool) -> Self {
        Self {
            source,
            root_directory,
            is_initial,
            document: None,
            remote_timeout: DEFAULT_TIMEOUT,
            remote_timeout_if_cached: DEFAULT_TIMEOUT_IF_CACHED,
        }
    }
}

/// How an edge was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// `child_config` in the parent, or a later command-line config
    ChildConfig,
    /// `parent_config` in the child
    ParentConfig,
}

/// Parent→child relation between two vertices, by arena index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub parent: usize,
    pub child: usize,
    pub kind: EdgeKind,
}

/// Arena of configuration documents and the edges between them.
#[derive(Debug, Clone, Default)]
pub struct FileGraph {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
}

fn is_remote_reference(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

impl FileGraph {
    /// Discover every document reachable from `initial_paths`.
    ///
    /// Command-line configs are chained in order, each later one acting as
    /// the child of the previous. Relative initial paths resolve against
    /// `working_directory`.
    pub fn build(
        initial_paths: &[String],
        working_directory: &NormalizedPath,
        remote: &RemoteConfigCache,
        session: &WarningSession,
    ) -> Result<Self> {
        let mut graph = Self::default();

        let mut initial = Vec::new();
        for path in initial_paths {
            let source = if is_remote_reference(path) {
                Source::Remote(path.clone())
            } else {
                Source::Local(NormalizedPath::new(path).absolutize(working_directory))
            };
            let root = match &source {
                Source::Local(p) => p.parent().unwrap_or_else(|| working_directory.clone()),
                Source::Remote(_) => working_directory.clone(),
            };
            let (index, _) = graph.vertex_for(source, root, true);
            if let Some(&previous) = initial.last() {
                graph.add_edge(Edge {
                    parent: previous,
                    child: index,
                    kind: EdgeKind::ChildConfig,
                });
            }
            initial.push(index);
        }

        for index in initial {
            if graph.vertices[index].document.is_none() {
                let mut chain = Vec::new();
                graph.process(index, &mut chain, remote, session)?;
            }
        }

        Ok(graph)
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    fn vertex_for(&mut self, source: Source, root_directory: NormalizedPath, is_initial: bool) -> (usize, bool) {
        if let Some(index) = self.vertices.iter().position(|v| v.source == source) {
            if is_initial {
                self.vertices[index].is_initial = true;
            }
            return (index, false);
        }
        self.vertices
            .push(Vertex::new(source, root_directory, is_initial));
        (self.vertices.len() - 1, true)
    }

    fn add_edge(&mut self, edge: Edge) {
        if !self.edges.contains(&edge) {
            self.edges.push(edge);
        }
    }

    /// Resolve one vertex, then follow its references depth-first.
    ///
    /// `chain` holds the vertices through which this one was discovered; a
    /// reference back into it is a cycle.
    fn process(
        &mut self,
        index: usize,
        chain: &mut Vec<usize>,
        remote: &RemoteConfigCache,
        session: &WarningSession,
    ) -> Result<()> {
        let document = self.load(index, remote, session)?;
        chain.push(index);

        let origin = self.vertices[index].source.to_string();
        let seconds = |key: ConfigKey| -> Result<Option<Duration>> {
            let value: Option<f64> = document
                .field(key.as_str())
                .map_err(|e| Error::decode(&origin, e))?;
            value
                .filter(|s| *s >= 0.0)
                .map(|s| {
                    Duration::try_from_secs_f64(s).map_err(|e| {
                        Error::decode(&origin, DecodeError::invalid(key.as_str(), format!("{s} seconds: {e}")))
                    })
                })
                .transpose()
        };
        let timeout = seconds(ConfigKey::RemoteTimeout)?.unwrap_or(self.vertices[index].remote_timeout);
        let timeout_if_cached = seconds(ConfigKey::RemoteTimeoutIfCached)?
            .unwrap_or(self.vertices[index].remote_timeout_if_cached);

        for (key, kind) in [
            (ConfigKey::ChildConfig, EdgeKind::ChildConfig),
            (ConfigKey::ParentConfig, EdgeKind::ParentConfig),
        ] {
            let Some(reference) = document
                .field::<String>(key.as_str())
                .map_err(|e| Error::decode(&origin, e))?
            else {
                continue;
            };

            let target = self.reference(index, &reference)?;
            if chain.contains(&target) {
                let mut names: Vec<String> = chain
                    .iter()
                    .map(|i| self.vertices[*i].source.to_string())
                    .collect();
                names.push(self.vertices[target].source.to_string());
                return Err(Error::CycleDetected {
                    chain: names.join(" -> "),
                });
            }

            let edge = match kind {
                EdgeKind::ChildConfig => Edge {
                    parent: index,
                    child: target,
                    kind,
                },
                EdgeKind::ParentConfig => Edge {
                    parent: target,
                    child: index,
                    kind,
                },
            };
            self.add_edge(edge);

            if self.vertices[target].document.is_none() {
                self.vertices[target].remote_timeout = timeout;
                self.vertices[target].remote_timeout_if_cached = timeout_if_cached;
                self.process(target, chain, remote, session)?;
            }
        }

        chain.pop();
        Ok(())
    }

    /// Vertex for a `child_config` / `parent_config` value found in `from`.
    fn reference(&mut self, from: usize, reference: &str) -> Result<usize> {
        let from_vertex = &self.vertices[from];
        let root = from_vertex.root_directory.clone();

        let (source, root_directory) = if is_remote_reference(reference) {
            (Source::Remote(reference.to_string()), root)
        } else {
            if let Source::Remote(url) = &from_vertex.source {
                return Err(Error::RemoteReferencesLocal {
                    url: url.clone(),
                    reference: reference.to_string(),
                });
            }
            let path = NormalizedPath::new(reference).absolutize(&root);
            let directory = path.parent().unwrap_or_else(|| root.clone());
            (Source::Local(path), directory)
        };

        Ok(self.vertex_for(source, root_directory, false).0)
    }

    /// Fetch or read a vertex's document and parse it.
    fn load(&mut self, index: usize, remote: &RemoteConfigCache, session: &WarningSession) -> Result<ConfigValue> {
        let vertex = &self.vertices[index];
        let text = match &vertex.source {
            Source::Local(path) => {
                if !path.is_file() {
                    return Err(if vertex.is_initial {
                        Error::FileNotFound {
                            path: path.to_native(),
                        }
                    } else {
                        Error::generic(format!("Referenced configuration file {path} can't be found."))
                    });
                }
                tracing::debug!(%path, "Loading configuration");
                io::read_text(path)?
            }
            Source::Remote(url) => remote.resolve(
                url,
                vertex.remote_timeout,
                vertex.remote_timeout_if_cached,
                session,
            )?,
        };

        let document = ConfigValue::from_yaml_str(&text).map_err(|e| Error::InvalidYaml {
            origin: vertex.source.to_string(),
            message: e.to_string(),
        })?;
        self.vertices[index].document = Some(document.clone());
        Ok(document)
    }

    /// Check for cycles and ambiguous inheritance.
    pub fn validate(&self) -> Result<()> {
        self.check_cycles()?;

        let pairs: BTreeSet<(usize, usize)> = self.edges.iter().map(|e| (e.parent, e.child)).collect();
        for (index, vertex) in self.vertices.iter().enumerate() {
            let children: Vec<usize> = pairs.iter().filter(|(p, _)| *p == index).map(|(_, c)| *c).collect();
            if children.len() > 1 {
                return Err(Error::AmbiguousChild {
                    vertex: vertex.source.to_string(),
                    children: self.names(&children),
                });
            }
            let parents: Vec<usize> = pairs.iter().filter(|(_, c)| *c == index).map(|(p, _)| *p).collect();
            if parents.len() > 1 {
                return Err(Error::AmbiguousParent {
                    vertex: vertex.source.to_string(),
                    parents: self.names(&parents),
                });
            }
        }
        Ok(())
    }

    fn names(&self, indices: &[usize]) -> String {
        indices
            .iter()
            .map(|i| self.vertices[*i].source.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn check_cycles(&self) -> Result<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }

        fn visit(graph: &FileGraph, index: usize, marks: &mut [Mark], stack: &mut Vec<usize>) -> Result<()> {
            marks[index] = Mark::InProgress;
            stack.push(index);
            for edge in graph.edges.iter().filter(|e| e.parent == index) {
                match marks[edge.child] {
                    Mark::InProgress => {
                        let start = stack.iter().position(|i| *i == edge.child).unwrap_or(0);
                        let mut cycle: Vec<usize> = stack[start..].to_vec();
                        cycle.push(edge.child);
                        return Err(Error::CycleDetected {
                            chain: cycle
                                .iter()
                                .map(|i| graph.vertices[*i].source.to_string())
                                .collect::<Vec<_>>()
                                .join(" -> "),
                        });
                    }
                    Mark::Unvisited => visit(graph, edge.child, marks, stack)?,
                    Mark::Done => {}
                }
            }
            stack.pop();
            marks[index] = Mark::Done;
            Ok(())
        }

        let mut marks = vec![Mark::Unvisited; self.vertices.len()];
        for index in 0..self.vertices.len() {
            if marks[index] == Mark::Unvisited {
                visit(self, index, &mut marks, &mut Vec::new())?;
            }
        }
        Ok(())
    }

    /// Vertices ordered root first, leaf last.
    ///
    /// Independent roots are emitted in discovery order.
    pub fn linearize(&self) -> Result<Vec<usize>> {
        self.validate()?;

        let mut order = Vec::with_capacity(self.vertices.len());
        for root in 0..self.vertices.len() {
            if self.edges.iter().any(|e| e.child == root) {
                continue;
            }
            let mut current = Some(root);
            while let Some(index) = current {
                order.push(index);
                current = self.edges.iter().find(|e| e.parent == index).map(|e| e.child);
            }
        }
        Ok(order)
    }

    /// Fold the linearized documents into one policy.
    pub fn resolve(&self, ctx: ParseContext<'_>) -> Result<Option<Configuration>> {
        let mut merged: Option<Configuration> = None;
        for index in self.linearize()? {
            let vertex = &self.vertices[index];
            let Some(document) = &vertex.document else {
                continue;
            };
            let config = Configuration::from_document(
                document,
                &vertex.source.to_string(),
                &vertex.root_directory,
                ctx,
            )?;
            merged = Some(match merged {
                Some(parent) => parent.merged(&config, ctx.catalog),
                None => config,
            });
        }
        Ok(merged)
    }
}
