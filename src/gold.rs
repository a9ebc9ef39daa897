//! Gold dependency trees.
//!
//! A [`GoldTree`] exposes, per sentence index, the head of that token and a map
//! from relation label to the ordered list of its dependents. Trees are built
//! from head columns ([`GoldTree::from_heads`]) or read from CoNLL text
//! ([`GoldTree::read_corpus`]), which accepts three layouts per token line:
//!
//! | Columns | Layout |
//! |---------|--------|
//! | 3 | `word tag head` (empty relation) |
//! | 4 | `word tag head rel` |
//! | 10 | CoNLL-X: `id form lemma cpostag postag feats head deprel phead pdeprel` |
//!
//! Blank lines separate sentences and lines starting with `#` are ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::diagnostics::{to_error_source, SourceArc, Span};
use crate::{err_ctx, err_msg, DepArc, ParseError, Sentence, ROOT_TAG};

/// One token of a gold tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldNode {
    pub address: usize,
    pub word: Option<String>,
    pub tag: String,
    /// `None` only for ROOT.
    pub head: Option<usize>,
    /// Relation to `head`; `None` only for ROOT.
    pub rel: Option<String>,
    pub deps: BTreeMap<String, Vec<usize>>,
}

impl GoldNode {
    pub fn root() -> Self {
        Self {
            address: 0,
            word: None,
            tag: ROOT_TAG.to_string(),
            head: None,
            rel: None,
            deps: BTreeMap::new(),
        }
    }

    /// All dependents regardless of relation.
    pub fn dependents(&self) -> impl Iterator<Item = usize> + '_ {
        self.deps.values().flatten().copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldTree {
    nodes: Vec<GoldNode>,
}

impl GoldTree {
    /// Builds a tree from one `(head, rel)` pair per word of `sentence`.
    pub fn from_heads<I, S>(sentence: &Sentence, heads: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = (usize, S)>,
        S: Into<String>,
    {
        let heads: Vec<(usize, String)> = heads.into_iter().map(|(h, r)| (h, r.into())).collect();
        if heads.len() != sentence.word_count() {
            return Err(err_msg!(
                Corpus,
                "{} heads given for a sentence of {} words",
                heads.len(),
                sentence.word_count()
            ));
        }
        let mut nodes = vec![GoldNode::root()];
        for (address, (token, (head, rel))) in sentence.tokens()[1..].iter().zip(heads).enumerate() {
            let address = address + 1;
            if head > sentence.word_count() || head == address {
                return Err(err_msg!(
                    Corpus,
                    "token {} has invalid head {}",
                    address,
                    head
                ));
            }
            nodes.push(GoldNode {
                address,
                word: token.word.clone(),
                tag: token.tag.clone(),
                head: Some(head),
                rel: Some(rel),
                deps: BTreeMap::new(),
            });
        }
        if let Some((_, message)) = tree_violation(&nodes) {
            return Err(err_msg!(Corpus, "{}", message));
        }
        Ok(Self::link(nodes))
    }

    /// Wraps externally built nodes. Node `i` must have address `i` and only ROOT may lack a head.
    pub fn from_nodes(nodes: Vec<GoldNode>) -> Result<Self, ParseError> {
        for (i, node) in nodes.iter().enumerate() {
            if node.address != i {
                return Err(err_msg!(
                    Corpus,
                    "node at position {} has address {}",
                    i,
                    node.address
                ));
            }
            if let Some(dep) = node.dependents().find(|&d| d == 0 || d >= nodes.len()) {
                return Err(err_msg!(
                    Corpus,
                    "node {} lists invalid dependent {}",
                    i,
                    dep
                ));
            }
        }
        if nodes.first().map(|n| n.head.is_some()).unwrap_or(true) {
            return Err(err_msg!(Corpus, "the first node must be a headless ROOT"));
        }
        Ok(Self { nodes })
    }

    /// Parses a single sentence of CoNLL text.
    pub fn from_conll(text: &str) -> Result<Self, ParseError> {
        let mut trees = Self::read_corpus("input", text)?;
        match trees.len() {
            1 => Ok(trees.remove(0)),
            n => Err(err_msg!(Corpus, "expected exactly one sentence, found {}", n)),
        }
    }

    /// Parses every sentence of a CoNLL corpus. `name` labels diagnostics.
    pub fn read_corpus(name: &str, text: &str) -> Result<Vec<Self>, ParseError> {
        let src = to_error_source(name, text);
        let mut trees = Vec::new();
        let mut block: Vec<GoldNode> = vec![GoldNode::root()];
        let mut spans: Vec<Span> = vec![Span::default()];
        let mut offset = 0;
        for line in text.split_inclusive('\n') {
            let span = Span {
                start: offset,
                end: offset + line.trim_end().len(),
            };
            offset += line.len();
            let line = line.trim();
            if line.is_empty() {
                if block.len() > 1 {
                    let nodes = std::mem::replace(&mut block, vec![GoldNode::root()]);
                    trees.push(Self::finish_block(nodes, &spans, &src)?);
                    spans.truncate(1);
                }
                continue;
            }
            if line.starts_with('#') {
                continue;
            }
            block.push(parse_token_line(line, block.len(), &src, span)?);
            spans.push(span);
        }
        if block.len() > 1 {
            trees.push(Self::finish_block(block, &spans, &src)?);
        }
        Ok(trees)
    }

    fn finish_block(nodes: Vec<GoldNode>, spans: &[Span], src: &SourceArc) -> Result<Self, ParseError> {
        let len = nodes.len();
        for node in &nodes {
            let Some(head) = node.head else { continue };
            if head >= len || head == node.address {
                return Err(err_ctx!(
                    Corpus,
                    format!("token {} has head {} outside the sentence", node.address, head),
                    src,
                    spans[node.address],
                    format!("heads must lie in [0, {}] and differ from the token itself", len - 1)
                ));
            }
        }
        if let Some((address, message)) = tree_violation(&nodes) {
            return Err(err_ctx!(
                Corpus,
                message,
                src,
                spans[address],
                "every word needs one head, exactly one word attaches to ROOT (head 0), and heads must not form a cycle"
            ));
        }
        Ok(Self::link(nodes))
    }

    /// Fills every node's `deps` from the heads of the other nodes.
    fn link(mut nodes: Vec<GoldNode>) -> Self {
        let edges: Vec<(usize, usize, String)> = nodes
            .iter()
            .filter_map(|n| Some((n.head?, n.address, n.rel.clone().unwrap_or_default())))
            .collect();
        for (head, dep, rel) in edges {
            nodes[head].deps.entry(rel).or_default().push(dep);
        }
        Self { nodes }
    }

    /// Number of nodes including ROOT.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn node(&self, index: usize) -> Option<&GoldNode> {
        self.nodes.get(index)
    }

    pub fn nodes(&self) -> &[GoldNode] {
        &self.nodes
    }

    pub fn head(&self, index: usize) -> Option<usize> {
        self.nodes.get(index)?.head
    }

    /// The label under which `head` records `dependent`, if it does.
    pub fn relation(&self, head: usize, dependent: usize) -> Option<&str> {
        self.nodes
            .get(head)?
            .deps
            .iter()
            .find(|(_, deps)| deps.contains(&dependent))
            .map(|(rel, _)| rel.as_str())
    }

    /// Dependents of `index` that precede it in the sentence.
    pub fn left_dependents(&self, index: usize) -> Vec<usize> {
        self.dependents_where(index, |d| d < index)
    }

    /// Dependents of `index` that follow it in the sentence.
    pub fn right_dependents(&self, index: usize) -> Vec<usize> {
        self.dependents_where(index, |d| d > index)
    }

    fn dependents_where(&self, index: usize, keep: impl Fn(usize) -> bool) -> Vec<usize> {
        let mut deps: Vec<usize> = self
            .nodes
            .get(index)
            .map(|n| n.dependents().filter(|&d| keep(d)).collect())
            .unwrap_or_default();
        deps.sort_unstable();
        deps
    }

    /// The sentence the tree is defined over.
    pub fn sentence(&self) -> Sentence {
        Sentence::new(
            self.nodes[1..]
                .iter()
                .map(|n| (n.word.clone().unwrap_or_default(), n.tag.clone())),
        )
    }

    /// Every gold arc, sorted.
    pub fn arcs(&self) -> Vec<DepArc> {
        let mut arcs: Vec<DepArc> = self
            .nodes
            .iter()
            .flat_map(|n| {
                n.deps
                    .iter()
                    .flat_map(move |(rel, deps)| deps.iter().map(move |&d| DepArc::new(n.address, d, rel.clone())))
            })
            .collect();
        arcs.sort();
        arcs
    }

    /// True when no two arcs cross, the ROOT attachment included.
    pub fn is_projective(&self) -> bool {
        let spans: Vec<(usize, usize)> = self
            .arcs()
            .iter()
            .map(|a| (a.head.min(a.dependent), a.head.max(a.dependent)))
            .collect();
        spans.iter().enumerate().all(|(i, &(l1, r1))| {
            spans[i + 1..]
                .iter()
                .all(|&(l2, r2)| !(l1 < l2 && l2 < r1 && r1 < r2) && !(l2 < l1 && l1 < r2 && r2 < r1))
        })
    }
}

/// First reason the heads of `nodes` do not form a single-rooted tree, with
/// the address of the offending token. Heads must already be in range.
fn tree_violation(nodes: &[GoldNode]) -> Option<(usize, String)> {
    let mut roots = nodes.iter().filter(|n| n.head == Some(0)).map(|n| n.address);
    match (roots.next(), roots.next()) {
        (None, _) if nodes.len() > 1 => return Some((1, "no token is attached to ROOT".to_string())),
        (Some(first), Some(second)) => {
            return Some((
                second,
                format!("token {second} is attached to ROOT but token {first} already is"),
            ))
        }
        _ => {}
    }
    for start in 1..nodes.len() {
        let mut current = start;
        for _ in 0..nodes.len() {
            match nodes[current].head {
                Some(head) if head != 0 => current = head,
                _ => break,
            }
        }
        if nodes[current].head.map_or(false, |head| head != 0) {
            return Some((start, format!("token {start} does not reach ROOT through its heads")));
        }
    }
    None
}

fn parse_token_line(line: &str, address: usize, src: &SourceArc, span: Span) -> Result<GoldNode, ParseError> {
    let cells: Vec<&str> = line.split_whitespace().collect();
    let (word, tag, head, rel) = match cells.len() {
        3 => (cells[0], cells[1], cells[2], ""),
        4 => (cells[0], cells[1], cells[2], cells[3]),
        10 => (cells[1], cells[3], cells[6], cells[7]),
        n => {
            return Err(err_ctx!(
                Corpus,
                format!("expected 3, 4 or 10 columns, found {n}"),
                src,
                span,
                "use `word tag head rel` or the CoNLL-X layout"
            ))
        }
    };
    let head: usize = head.parse().map_err(|_| {
        err_ctx!(
            Corpus,
            format!("head column '{head}' is not a number"),
            src,
            span
        )
    })?;
    Ok(GoldNode {
        address,
        word: Some(word.to_string()),
        tag: tag.to_string(),
        head: Some(head),
        rel: Some(rel.to_string()),
        deps: BTreeMap::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIVE: &str = "\
word_1 tag_1 0 ROOT
word_2 tag_2 3 deprel_2
word_3 tag_3 5 deprel_3
word_4 tag_4 3 deprel_4
word_5 tag_5 1 deprel_5
";

    #[test]
    fn reads_four_column_sentence() {
        let tree = GoldTree::from_conll(FIVE).unwrap();
        assert_eq!(tree.len(), 6);
        assert_eq!(tree.head(2), Some(3));
        assert_eq!(tree.head(0), None);
        assert_eq!(tree.relation(0, 1), Some("ROOT"));
        assert_eq!(tree.relation(3, 2), Some("deprel_2"));
        assert_eq!(tree.relation(2, 3), None);
        assert_eq!(tree.left_dependents(3), vec![2]);
        assert_eq!(tree.right_dependents(3), vec![4]);
        assert!(tree.is_projective());
    }

    #[test]
    fn reads_conll_x_and_comments() {
        let text = "# sent 1\n1\tHe\the\tPRP\tPRP\t_\t2\tnsubj\t_\t_\n2\truns\trun\tVBZ\tVBZ\t_\t0\troot\t_\t_\n";
        let tree = GoldTree::from_conll(text).unwrap();
        assert_eq!(tree.sentence().words().collect::<Vec<_>>(), vec!["He", "runs"]);
        assert_eq!(tree.node(1).unwrap().tag, "PRP");
        assert_eq!(tree.relation(0, 2), Some("root"));
    }

    #[test]
    fn splits_corpus_on_blank_lines() {
        let text = format!("{FIVE}\n\na DT 0 root\n");
        let trees = GoldTree::read_corpus("two.conll", &text).unwrap();
        assert_eq!(trees.len(), 2);
        assert_eq!(trees[1].len(), 2);
    }

    #[test]
    fn bad_head_column_is_reported() {
        let err = GoldTree::from_conll("a DT zero root\n").unwrap_err();
        assert!(matches!(err, ParseError::Corpus { .. }));
        assert!(err.to_string().contains("'zero' is not a number"));
    }

    #[test]
    fn out_of_range_head_is_reported() {
        let err = GoldTree::from_conll("a DT 4 root\n").unwrap_err();
        assert!(err.to_string().contains("outside the sentence"));
    }

    #[test]
    fn second_root_attachment_is_rejected() {
        let err = GoldTree::read_corpus("roots.conll", "a A 0 root\nb B 0 root\n").unwrap_err();
        assert!(matches!(err, ParseError::Corpus { .. }));
        assert!(err.to_string().contains("token 2 is attached to ROOT but token 1 already is"));
        match err {
            ParseError::Corpus { ctx, .. } => assert_eq!(ctx.span, Some(Span { start: 11, end: 21 })),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn head_cycles_are_rejected() {
        let err = GoldTree::from_conll("a A 2 x\nb B 1 y\n").unwrap_err();
        assert!(err.to_string().contains("no token is attached to ROOT"));

        let err = GoldTree::from_conll("a A 0 root\nb B 3 x\nc C 2 y\n").unwrap_err();
        assert!(err.to_string().contains("token 2 does not reach ROOT through its heads"), "{err}");

        let sentence = Sentence::new([("a", "A"), ("b", "B"), ("c", "C")]);
        let err = GoldTree::from_heads(&sentence, [(0, "root"), (3, "x"), (2, "y")]).unwrap_err();
        assert!(matches!(err, ParseError::Corpus { .. }));
        assert!(GoldTree::from_heads(&sentence, [(0, "root"), (0, "x"), (2, "y")]).is_err());
    }

    #[test]
    fn from_heads_matches_conll() {
        let sentence = GoldTree::from_conll(FIVE).unwrap().sentence();
        let heads = [(0, "ROOT"), (3, "deprel_2"), (5, "deprel_3"), (3, "deprel_4"), (1, "deprel_5")];
        let tree = GoldTree::from_heads(&sentence, heads).unwrap();
        assert_eq!(tree, GoldTree::from_conll(FIVE).unwrap());
    }

    #[test]
    fn crossing_arcs_are_not_projective() {
        let sentence = Sentence::new([("a", "A"), ("b", "B"), ("c", "C"), ("d", "D")]);
        // 1 -> 3 crosses 2 -> 4
        let tree = GoldTree::from_heads(&sentence, [(0, "root"), (1, "x"), (1, "y"), (2, "z")]).unwrap();
        assert!(!tree.is_projective());
    }

    #[test]
    fn shared_endpoints_do_not_cross() {
        let sentence = Sentence::new([("a", "A"), ("b", "B"), ("c", "C")]);
        let tree = GoldTree::from_heads(&sentence, [(3, "x"), (3, "y"), (0, "root")]).unwrap();
        assert!(tree.is_projective());
    }

    #[test]
    fn from_nodes_requires_rooted_addresses() {
        let mut node = GoldNode::root();
        node.address = 1;
        assert!(GoldTree::from_nodes(vec![node]).is_err());
        assert!(GoldTree::from_nodes(vec![GoldNode::root()]).is_ok());
    }
}
