//! Rendering of decoded paths: the default `surface\tfeature` layout, wakati,
//! a JSON dump, and MeCab-style node templates.

use std::fmt::{self, Write as _};

use serde::Serialize;

use super::{Lattice, NodeRef, NodeStatus, RequestKind, UNREACHABLE};
use crate::error::TaggerError;
use crate::model::options::{ModelOptions, OutputFormatType};
use crate::model::ModelData;
use crate::settings::settings;
use crate::tagger::cost::CostFunction;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Literal(String),
    Surface,
    Feature,
    FeatureFields(Vec<usize>),
    Status,
    WordCost,
    PathCost,
    ConnectionCost,
    Begin,
    End,
    Length,
    LeftAttr,
    RightAttr,
    NodeIndex,
    BestMark,
    Prob,
    Alpha,
    Beta,
    Sentence,
    SentenceLen,
}

/// A compiled output template.
///
/// Directives: `%m`/`%M` surface, `%H` feature, `%f[N]` / `%f[N,M,..]`
/// feature fields, `%s` status code, `%c`/`%pw` word cost, `%pc` path cost,
/// `%pC` connection cost from the path predecessor, `%ps`/`%pe`/`%pl` begin,
/// end and length, `%phl`/`%phr` left and right attributes, `%pi` node id,
/// `%pb` `*` on the current path, `%P`/`%pP` marginal probability, `%pA`/`%pB`
/// forward and backward scores, `%S` sentence, `%L` sentence length, `%%`.
/// Escapes: `\t`, `\n`, `\s` (space), `\\`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Template {
    tokens: Vec<Token>,
}

impl Template {
    pub fn parse(template: &str) -> Result<Self, TaggerError> {
        let fail = |reason: String| TaggerError::InvalidFormat {
            template: template.to_string(),
            reason,
        };
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some('t') => literal.push('\t'),
                    Some('n') => literal.push('\n'),
                    Some('s') => literal.push(' '),
                    Some('\\') => literal.push('\\'),
                    Some(other) => return Err(fail(format!("unknown escape \\{other}"))),
                    None => return Err(fail("dangling backslash".to_string())),
                },
                '%' => {
                    let token = match chars.next() {
                        Some('%') => {
                            literal.push('%');
                            continue;
                        }
                        Some('m') | Some('M') => Token::Surface,
                        Some('H') => Token::Feature,
                        Some('s') => Token::Status,
                        Some('c') => Token::WordCost,
                        Some('P') => Token::Prob,
                        Some('S') => Token::Sentence,
                        Some('L') => Token::SentenceLen,
                        Some('f') => {
                            if chars.next() != Some('[') {
                                return Err(fail("expected '[' after %f".to_string()));
                            }
                            let mut body = String::new();
                            loop {
                                match chars.next() {
                                    Some(']') => break,
                                    Some(ch) => body.push(ch),
                                    None => return Err(fail("unterminated %f[".to_string())),
                                }
                            }
                            let fields = body
                                .split(',')
                                .map(|n| n.trim().parse::<usize>())
                                .collect::<Result<Vec<_>, _>>()
                                .map_err(|e| fail(format!("bad field index in %f[{body}]: {e}")))?;
                            Token::FeatureFields(fields)
                        }
                        Some('p') => match chars.next() {
                            Some('w') => Token::WordCost,
                            Some('c') => Token::PathCost,
                            Some('C') => Token::ConnectionCost,
                            Some('s') => Token::Begin,
                            Some('e') => Token::End,
                            Some('l') => Token::Length,
                            Some('i') => Token::NodeIndex,
                            Some('b') => Token::BestMark,
                            Some('P') => Token::Prob,
                            Some('A') => Token::Alpha,
                            Some('B') => Token::Beta,
                            Some('h') => match chars.next() {
                                Some('l') => Token::LeftAttr,
                                Some('r') => Token::RightAttr,
                                _ => return Err(fail("expected %phl or %phr".to_string())),
                            },
                            other => {
                                return Err(fail(format!("unknown directive %p{}", opt_char(other))))
                            }
                        },
                        other => return Err(fail(format!("unknown directive %{}", opt_char(other)))),
                    };
                    if !literal.is_empty() {
                        tokens.push(Token::Literal(std::mem::take(&mut literal)));
                    }
                    tokens.push(token);
                }
                _ => literal.push(c),
            }
        }
        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }
        Ok(Self { tokens })
    }

    fn literal(text: impl Into<String>) -> Self {
        Self {
            tokens: vec![Token::Literal(text.into())],
        }
    }

    fn from_tokens(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    fn render(&self, out: &mut String, lattice: &Lattice, node: &NodeRef<'_>, model: &ModelData) {
        for token in &self.tokens {
            match token {
                Token::Literal(s) => out.push_str(s),
                Token::Surface => out.push_str(node.surface()),
                Token::Feature => out.push_str(node.feature()),
                Token::FeatureFields(indices) => {
                    let fields = node.feature_fields();
                    let picked: Vec<&str> = indices
                        .iter()
                        .map(|&i| fields.get(i).map_or("*", String::as_str))
                        .collect();
                    out.push_str(&picked.join(","));
                }
                Token::Status => push_display(out, node.status().code()),
                Token::WordCost => push_display(out, node.wcost()),
                Token::PathCost => {
                    if node.cost() == UNREACHABLE {
                        out.push('*');
                    } else {
                        push_display(out, node.cost());
                    }
                }
                Token::ConnectionCost => {
                    let cost = node
                        .prev()
                        .map_or(0, |prev| model.transition_cost(prev.node(), node.node()));
                    push_display(out, cost);
                }
                Token::Begin => push_display(out, node.begin()),
                Token::End => push_display(out, node.end()),
                Token::Length => push_display(out, node.len()),
                Token::LeftAttr => push_display(out, node.left_attr().0),
                Token::RightAttr => push_display(out, node.right_attr().0),
                Token::NodeIndex => push_display(out, node.id().index()),
                Token::BestMark => out.push(if node.is_best() { '*' } else { ' ' }),
                Token::Prob => push_display(out, format_args!("{:.6}", node.prob())),
                Token::Alpha => push_display(out, format_args!("{:.6}", node.alpha())),
                Token::Beta => push_display(out, format_args!("{:.6}", node.beta())),
                Token::Sentence => out.push_str(lattice.sentence().unwrap_or("")),
                Token::SentenceLen => push_display(out, lattice.len()),
            }
        }
    }
}

fn push_display(out: &mut String, value: impl fmt::Display) {
    // Writing into a String cannot fail.
    let _ = write!(out, "{value}");
}

fn opt_char(c: Option<char>) -> String {
    c.map(String::from).unwrap_or_default()
}

/// Templates selected by the model options.
#[derive(Debug, Clone)]
pub(crate) struct OutputFormats {
    kind: OutputFormatType,
    node: Template,
    unk: Template,
    bos: Option<Template>,
    eos: Template,
    eon: Option<Template>,
}

impl OutputFormats {
    pub fn from_options(options: &ModelOptions) -> Result<Self, TaggerError> {
        let s = settings();
        let compile = |t: &Option<String>| t.as_deref().map(Template::parse).transpose();

        let (default_node, default_eos) = match options.output_format_type {
            OutputFormatType::Wakati => (
                Template::from_tokens(vec![
                    Token::Surface,
                    Token::Literal(s.output.wakati_separator.clone()),
                ]),
                Template::literal("\n"),
            ),
            OutputFormatType::Lattice | OutputFormatType::Dump => (
                Template::from_tokens(vec![
                    Token::Surface,
                    Token::Literal("\t".to_string()),
                    Token::Feature,
                    Token::Literal("\n".to_string()),
                ]),
                Template::literal(s.output.eos_format.clone()),
            ),
        };

        let node = compile(&options.node_format)?.unwrap_or(default_node);
        let unk = compile(&options.unk_format)?.unwrap_or_else(|| node.clone());
        Ok(Self {
            kind: options.output_format_type,
            node,
            unk,
            bos: compile(&options.bos_format)?,
            eos: compile(&options.eos_format)?.unwrap_or(default_eos),
            eon: compile(&options.eon_format)?,
        })
    }

    fn node_template(&self, status: NodeStatus) -> Option<&Template> {
        match status {
            NodeStatus::Normal => Some(&self.node),
            NodeStatus::Unknown => Some(&self.unk),
            NodeStatus::Bos => self.bos.as_ref(),
            NodeStatus::Eos => Some(&self.eos),
        }
    }
}

/// Render the lattice's current path according to the model's formats and
/// the lattice's request flags.
pub(crate) fn write_path(
    lattice: &Lattice,
    model: &ModelData,
    out: &mut String,
) -> Result<(), TaggerError> {
    let formats = model.formats();
    if formats.kind == OutputFormatType::Dump {
        return write_dump(lattice, out);
    }

    if lattice.has_request_type(RequestKind::AllMorphs) {
        for pos in 0..lattice.len() {
            for node in lattice.begin_nodes(pos).filter(|n| n.is_alive()) {
                if let Some(t) = formats.node_template(node.status()) {
                    t.render(out, lattice, &node, model);
                }
            }
        }
        if let Some(eos) = lattice.eos_node() {
            formats.eos.render(out, lattice, &eos, model);
        }
        return Ok(());
    }

    let alternatives = lattice.has_request_type(RequestKind::Alternative);
    for node in lattice.iter_nodes() {
        if let Some(t) = formats.node_template(node.status()) {
            t.render(out, lattice, &node, model);
        }
        if alternatives && node.status() != NodeStatus::Bos && node.status() != NodeStatus::Eos {
            for alt in lattice
                .begin_nodes(node.begin())
                .filter(|n| n.is_alive() && n.id() != node.id())
            {
                if let Some(t) = formats.node_template(alt.status()) {
                    out.push('\t');
                    t.render(out, lattice, &alt, model);
                }
            }
        }
    }
    Ok(())
}

pub(crate) fn write_eon(lattice: &Lattice, model: &ModelData, out: &mut String) {
    if let (Some(eon), Some(eos)) = (&model.formats().eon, lattice.eos_node()) {
        eon.render(out, lattice, &eos, model);
    }
}

#[derive(Serialize)]
struct DumpNode<'a> {
    id: usize,
    surface: &'a str,
    feature: &'a str,
    status: &'static str,
    begin: usize,
    end: usize,
    left_attr: u16,
    right_attr: u16,
    wcost: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    cost: Option<i64>,
    alive: bool,
    best: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    prob: Option<f64>,
}

#[derive(Serialize)]
struct DumpDocument<'a> {
    sentence: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cost: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    z: Option<f64>,
    nodes: Vec<DumpNode<'a>>,
}

fn write_dump(lattice: &Lattice, out: &mut String) -> Result<(), TaggerError> {
    let marginal = lattice.has_request_type(RequestKind::MarginalProb);
    let nodes = lattice
        .nodes()
        .filter(|n| n.is_linked())
        .map(|n| DumpNode {
            id: n.id().index(),
            surface: n.surface(),
            feature: n.node().feature(),
            status: match n.status() {
                NodeStatus::Normal => "normal",
                NodeStatus::Unknown => "unknown",
                NodeStatus::Bos => "bos",
                NodeStatus::Eos => "eos",
            },
            begin: n.begin(),
            end: n.end(),
            left_attr: n.left_attr().0,
            right_attr: n.right_attr().0,
            wcost: n.wcost(),
            cost: (n.cost() != UNREACHABLE).then_some(n.cost()),
            alive: n.is_alive(),
            best: n.is_best(),
            prob: marginal.then_some(n.prob()),
        })
        .collect();
    let doc = DumpDocument {
        sentence: lattice.sentence().unwrap_or(""),
        cost: lattice.path_cost(),
        z: lattice.z(),
        nodes,
    };
    let json = serde_json::to_string(&doc)
        .map_err(|e| TaggerError::NotReady(format!("dump serialization failed: {e}")))?;
    out.push_str(&json);
    out.push('\n');
    Ok(())
}
