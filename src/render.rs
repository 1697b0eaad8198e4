//! # Tree Rendering
//!
//! Turns a scanned [`PathNode`] tree into the annotated, box-drawn report.
//!
//! Rendering happens in two steps. The recursive part produces [`Line`]s,
//! each a list of [`Guide`] tokens (the tree-drawing prefix) plus its text;
//! a parent only ever prepends one guide to the lines of a child. A single
//! flattening pass then turns guides into glyphs and joins the lines.
//!
//! Layout rules for a directory that contains repos:
//!
//! - every child gets a branch glyph (`├╴`, or `╰╴` for the last child)
//!   followed by its name;
//! - a nested directory with repos puts `name: ` on its own line and its
//!   children below, behind a continuation glyph (`│`, or blank after the
//!   last child);
//! - a single-line leaf is appended inline as `name: label`;
//! - a multi-line leaf (a git repo with problems) is bracketed with
//!   `⎧ ⎪ ⎩`, its continuation lines padded by the display width of the
//!   name so the bracket lines up.
//!
//! Directories without repos are never expanded.
//!
//! ```
//! use repo_manager::node::{DirEntry, DirectoryNode, GitStatus, PathNode};
//! use repo_manager::render::render;
//!
//! let tree = PathNode::Directory(DirectoryNode::new(vec![
//!     DirEntry { name: "repo".into(), node: PathNode::GitRepo(GitStatus::default()) },
//!     DirEntry { name: "notes".into(), node: PathNode::PlainFile },
//! ]));
//! let text = render(&tree, false);
//! assert!(text.starts_with(" ├╴repo⎧ Git repo\n"));
//! assert!(text.ends_with(" ╰╴notes: File"));
//! ```

use console::measure_text_width;

use crate::node::{DirectoryNode, GitStatus, PathNode};
use crate::output::{paint, Tone};
use crate::scan::ScanSummary;

/// One token of the tree-drawing prefix of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guide {
    /// Branch to a child that has later siblings.
    Tee,
    /// Branch to the last child.
    Corner,
    /// Continuation below a child that has later siblings.
    Pipe,
    /// Continuation below the last child.
    Blank,
    /// Spaces aligning a bracketed block under the text above it.
    Pad(usize),
}

impl Guide {
    fn glyph(self, color: bool) -> String {
        match self {
            Guide::Tee => paint(" ├╴", Tone::Guide, color),
            Guide::Corner => paint(" ╰╴", Tone::Guide, color),
            Guide::Pipe => paint(" │ ", Tone::Guide, color),
            Guide::Blank => "   ".to_string(),
            Guide::Pad(width) => " ".repeat(width),
        }
    }
}

/// A rendered line before flattening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub guides: Vec<Guide>,
    pub text: String,
}

impl Line {
    fn new(text: String) -> Self {
        Self {
            guides: Vec::new(),
            text,
        }
    }

    fn padded(width: usize, text: String) -> Self {
        Self {
            guides: vec![Guide::Pad(width)],
            text,
        }
    }

    fn behind(mut self, guide: Guide) -> Self {
        self.guides.insert(0, guide);
        self
    }
}

/// Render a node on its own.
///
/// Leaves and repo-free directories give their label (one line per git
/// problem); a directory with repos gives its child lines.
pub fn render(node: &PathNode, color: bool) -> String {
    match node {
        PathNode::Directory(dir) if dir.contains_repo => flatten(&layout(dir, color), color),
        _ => labels(node, color).join("\n"),
    }
}

/// Render the report for a scan root as `name: ` followed by the node.
///
/// Unlike a child inside a directory, a multi-line root is not bracketed.
pub fn render_report(name: &str, node: &PathNode, color: bool) -> String {
    let body = render(node, color);
    match node {
        PathNode::Directory(dir) if dir.contains_repo => format!("{name}: \n{body}"),
        _ => format!("{name}: {body}"),
    }
}

/// The trailing `N clean repos, M dirty repos` line.
pub fn render_summary(summary: &ScanSummary, color: bool) -> String {
    let clean = paint(&summary.clean_repos.to_string(), Tone::Good, color);
    let dirty = if summary.problem_repos > 0 {
        format!(
            "{} dirty repos",
            paint(&summary.problem_repos.to_string(), Tone::Bad, color)
        )
    } else {
        paint("No dirty repos", Tone::Good, color)
    };
    format!("{clean} clean repos, {dirty}")
}

/// Child lines of a directory that contains repos.
pub fn layout(dir: &DirectoryNode, color: bool) -> Vec<Line> {
    let count = dir.children.len();
    let mut lines = Vec::new();
    for (index, entry) in dir.children.iter().enumerate() {
        let (branch, continuation) = if index + 1 == count {
            (Guide::Corner, Guide::Blank)
        } else {
            (Guide::Tee, Guide::Pipe)
        };
        let mut child = entry_lines(&entry.name, &entry.node, color).into_iter();
        if let Some(head) = child.next() {
            lines.push(head.behind(branch));
        }
        lines.extend(child.map(|line| line.behind(continuation)));
    }
    lines
}

/// Lines for `name` and its node, with no branch glyph yet. The first line
/// is the head; the rest hang below it.
fn entry_lines(name: &str, node: &PathNode, color: bool) -> Vec<Line> {
    if let PathNode::Directory(dir) = node {
        if dir.contains_repo {
            let mut lines = vec![Line::new(format!("{name}: "))];
            lines.extend(layout(dir, color));
            return lines;
        }
    }

    let labels = labels(node, color);
    match labels.as_slice() {
        [] => vec![Line::new(name.to_string())],
        [only] => vec![Line::new(format!("{name}: {only}"))],
        [first, middle @ .., last] => {
            // Display columns rather than chars, so wide names stay aligned
            let width = measure_text_width(name);
            let mut lines = vec![Line::new(format!("{name}⎧ {first}"))];
            lines.extend(
                middle
                    .iter()
                    .map(|label| Line::padded(width, format!("⎪ {label}"))),
            );
            lines.push(Line::padded(width, format!("⎩ {last}")));
            lines
        }
    }
}

/// The label lines of a node that is shown without expansion.
fn labels(node: &PathNode, color: bool) -> Vec<String> {
    match node {
        PathNode::PlainFile => vec![paint("File", Tone::Neutral, color)],
        PathNode::Symlink { target } => vec![paint(
            &format!("Link to {}", target.display()),
            Tone::Link,
            color,
        )],
        PathNode::MercurialRepo => vec![paint("Mercurial repo", Tone::Mercurial, color)],
        PathNode::Directory(_) => vec![paint("Directory without repos", Tone::Neutral, color)],
        PathNode::GitRepo(status) => git_labels(status, color),
    }
}

fn git_labels(status: &GitStatus, color: bool) -> Vec<String> {
    let problem = status.is_problem();
    let mut labels = vec![if problem { "Git repo" } else { "Clean Git repo" }];
    if !status.clean_working_tree {
        labels.push("Working tree dirty");
    }
    if !status.has_remotes() {
        labels.push("No remotes");
    }
    if !status.synced_with_remote {
        labels.push("Not synced with remote");
    }

    let tone = if problem { Tone::Bad } else { Tone::Good };
    labels
        .into_iter()
        .map(|label| paint(label, tone, color))
        .collect()
}

/// Turn guide tokens into glyphs and join the lines.
pub fn flatten(lines: &[Line], color: bool) -> String {
    lines
        .iter()
        .map(|line| {
            let mut out: String = line.guides.iter().map(|g| g.glyph(color)).collect();
            out.push_str(&line.text);
            out
        })
        .collect::<Vec<_>>()
        .join("\n")
}
