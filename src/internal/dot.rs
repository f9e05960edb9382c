//! The `dot` module contains the conversion of a compiled context to the graphviz dot format.
//! The functions in this module are used for testing and debugging purposes.

use std::io::Write;

use dot_writer::{Attributes, DotWriter, RankDirection};

use crate::ScannerCtxt;

/// Render the automaton of a scanner context to the graphviz dot format. The start state is
/// drawn blue, accepting states red and labelled with the names of their patterns.
pub(crate) fn dfa_render<W: Write>(ctxt: &ScannerCtxt, label: &str, output: &mut W) {
    let dfa = ctxt.dfa();
    let mut writer = DotWriter::from(output);
    writer.set_pretty_print(true);
    let mut digraph = writer.digraph();
    digraph
        .set_label(label)
        .set_rank_direction(RankDirection::LeftRight);
    for state in dfa.states() {
        let mut node = digraph.node_auto();
        node.set_label(&state.id.to_string());
        if state.id == dfa.start() {
            node.set_shape(dot_writer::Shape::Circle)
                .set_color(dot_writer::Color::Blue)
                .set_pen_width(3.0);
        }
        if state.accepting {
            let names = ctxt
                .state_patterns()
                .get(&state.id)
                .map(|patterns| {
                    patterns
                        .iter()
                        .map(|&p| ctxt.pattern(p).name())
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_default();
            node.set_color(dot_writer::Color::Red)
                .set_pen_width(3.0)
                .set_label(&format!("{}\n'{}'", state.id, names.escape_default()));
        }
    }
    for state in dfa.states() {
        for (set, target) in &state.transitions {
            digraph
                .edge(
                    &format!("node_{}", state.id.as_usize()),
                    &format!("node_{}", target.as_usize()),
                )
                .attributes()
                .set_label(&format!("{}", set).escape_default().to_string());
        }
        if state.default != state.id {
            digraph
                .edge(
                    &format!("node_{}", state.id.as_usize()),
                    &format!("node_{}", state.default.as_usize()),
                )
                .attributes()
                .set_label("default");
        }
    }
}
