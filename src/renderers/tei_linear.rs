//! TEI renderer for linear trees
//!
//! Emits one block element per line of text. Spans annotated by the
//! apparatus feature filter become `<app>` elements: a `<lem>` with the
//! base text and the witnesses of the entries without variant, then one
//! `<rdg>` per variant entry in entry order. Spans linked to the
//! configured layers are wrapped in `<seg>` elements whose `ana` holds a
//! `#[seg/fragmentId]#` placeholder for the source-id text filter.

use serde::Deserialize;

use crate::context::RendererContext;
use crate::error::{ExportError, Result};
use crate::filters::{
    FEATURE_AUTHOR, FEATURE_AUTHOR_NOTE, FEATURE_NOTE, FEATURE_VARIANT, FEATURE_WITNESS, FEATURE_WITNESS_NOTE,
};
use crate::tree::{FeatureSet, TextSpan, TextTree};

use super::{pointers, wit_resp_attributes, xml_escape, TextTreeRenderer};

/// Id map prefix for `<seg>` placeholders
pub const SEG_MAP_NAME: &str = "seg";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeiLinearOptions {
    /// Element wrapping each line, numbered by an `n` attribute
    pub block_name: String,
    /// Roles of the layers whose fragments get a `<seg>`
    pub linked_role_ids: Vec<String>,
}

impl Default for TeiLinearOptions {
    fn default() -> Self {
        Self {
            block_name: "p".to_string(),
            linked_role_ids: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TeiLinearTextTreeRenderer {
    options: TeiLinearOptions,
}

/// Pointer attributes and notes of one apparatus entry
#[derive(Default)]
struct EntryParts<'a> {
    witnesses: Vec<&'a str>,
    authors: Vec<&'a str>,
    notes: String,
}

impl<'a> EntryParts<'a> {
    fn collect(set: &'a FeatureSet, into: &mut Self) {
        let mut witness = None;
        let mut author = None;
        for feature in &set.features {
            let value = feature.value.as_str();
            match feature.name.as_str() {
                FEATURE_WITNESS => {
                    into.witnesses.push(value);
                    witness = Some(value);
                }
                FEATURE_AUTHOR => {
                    into.authors.push(value);
                    author = Some(value);
                }
                FEATURE_WITNESS_NOTE => into.notes.push_str(&format!(
                    "<witDetail wit=\"{}\">{}</witDetail>",
                    pointers(witness),
                    xml_escape(value)
                )),
                FEATURE_AUTHOR_NOTE => into.notes.push_str(&format!(
                    "<note resp=\"{}\">{}</note>",
                    pointers(author),
                    xml_escape(value)
                )),
                FEATURE_NOTE => into.notes.push_str(&format!("<note>{}</note>", xml_escape(value))),
                _ => {}
            }
        }
    }

    fn attributes(&self) -> String {
        wit_resp_attributes(&self.witnesses, &self.authors)
    }
}

impl TeiLinearTextTreeRenderer {
    pub fn new(options: TeiLinearOptions) -> Self {
        Self { options }
    }

    fn render_app(&self, span: &TextSpan) -> String {
        let mut lemma = EntryParts::default();
        let mut readings = String::new();

        for set in span.feature_sets.values() {
            match set.first_value(FEATURE_VARIANT) {
                None => EntryParts::collect(set, &mut lemma),
                Some(variant) => {
                    let mut reading = EntryParts::default();
                    EntryParts::collect(set, &mut reading);
                    readings.push_str(&format!(
                        "<rdg{}>{}{}</rdg>",
                        reading.attributes(),
                        xml_escape(variant),
                        reading.notes
                    ));
                }
            }
        }

        format!(
            "<app><lem{}>{}{}</lem>{}</app>",
            lemma.attributes(),
            xml_escape(&span.text),
            lemma.notes,
            readings
        )
    }
}

impl TextTreeRenderer for TeiLinearTextTreeRenderer {
    fn render(&self, tree: &TextTree, context: &RendererContext) -> Result<String> {
        if !tree.is_linear() {
            return Err(ExportError::InvalidArgument(
                "linear TEI rendering needs a linear tree".to_string(),
            ));
        }

        let linked_prefixes: Vec<String> = context
            .item()
            .map(|item| {
                item.layers()
                    .filter(|(part, _)| self.options.linked_role_ids.contains(&part.role_id))
                    .map(|(part, _)| part.fragment_id_prefix())
                    .collect()
            })
            .unwrap_or_default();

        let name = &self.options.block_name;
        let mut xml = String::new();
        let mut block = 0;
        let mut open = false;

        for span in tree.chain_data() {
            if !open {
                block += 1;
                xml.push_str(&format!("<{} n=\"{}\">", name, block));
                open = true;
            }

            let mut content = if span.feature_sets.is_empty() {
                xml_escape(&span.text)
            } else {
                self.render_app(span)
            };
            for prefix in &linked_prefixes {
                for fragment_id in span.fragment_ids_with_prefix(prefix) {
                    context.map_source_id(SEG_MAP_NAME, fragment_id);
                    content = format!(
                        "<seg ana=\"#[{}/{}]#\">{}</seg>",
                        SEG_MAP_NAME,
                        xml_escape(fragment_id),
                        content
                    );
                }
            }
            xml.push_str(&content);

            if span.is_before_eol {
                xml.push_str(&format!("</{}>\n", name));
                open = false;
            }
        }
        if open {
            xml.push_str(&format!("</{}>", name));
        }
        Ok(xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Item, Part, COMMENT_ROLE_ID};
    use crate::text::TextRange;
    use crate::tree::Feature;

    fn span(text: &str, eol: bool) -> TextSpan {
        let mut span = TextSpan::synthetic(text);
        span.is_before_eol = eol;
        span
    }

    fn render(spans: Vec<TextSpan>, options: TeiLinearOptions, context: &RendererContext) -> String {
        let tree = TextTree::linear(spans.into_iter().enumerate().map(|(i, s)| (i as u32 + 1, None, s)));
        TeiLinearTextTreeRenderer::new(options).render(&tree, context).unwrap()
    }

    #[test]
    fn test_blocks_follow_line_ends() {
        let xml = render(
            vec![span("a & b", true), span("c", false), span("d", false)],
            TeiLinearOptions::default(),
            &RendererContext::new(),
        );
        assert_eq!(xml, "<p n=\"1\">a &amp; b</p>\n<p n=\"2\">cd</p>");
    }

    #[test]
    fn test_app_with_lemma_and_readings() {
        let mut illuc = span("illuc", false);
        illuc.add_set_feature("e000", Some("fr@0"), Feature::new(FEATURE_WITNESS, "O1"));
        illuc.add_set_feature("e001", Some("fr@0"), Feature::new(FEATURE_VARIANT, "illud"));
        illuc.add_set_feature("e001", Some("fr@0"), Feature::new(FEATURE_WITNESS, "O"));
        illuc.add_set_feature("e001", Some("fr@0"), Feature::new(FEATURE_WITNESS, "G"));
        illuc.add_set_feature("e002", Some("fr@0"), Feature::new(FEATURE_VARIANT, "illic"));
        illuc.add_set_feature("e002", Some("fr@0"), Feature::new(FEATURE_AUTHOR, "Fruterius"));
        illuc.add_set_feature("e002", Some("fr@0"), Feature::new(FEATURE_AUTHOR_NOTE, "1605a"));

        let xml = render(vec![illuc], TeiLinearOptions::default(), &RendererContext::new());
        assert_eq!(
            xml,
            "<p n=\"1\"><app><lem wit=\"#O1\">illuc</lem>\
             <rdg wit=\"#O #G\">illud</rdg>\
             <rdg resp=\"#Fruterius\">illic<note resp=\"#Fruterius\">1605a</note></rdg></app></p>"
        );
        let doc = roxmltree::Document::parse(&xml).unwrap();
        assert_eq!(doc.descendants().filter(|n| n.has_tag_name("rdg")).count(), 2);
    }

    #[test]
    fn test_linked_fragments_get_seg_placeholders() {
        let part = Part::layer("p2", COMMENT_ROLE_ID, Vec::new());
        let item = Item::new("i", "t").with_part(part.clone());
        let context = RendererContext::for_item(&item);

        let range = TextRange::with_fragment(0, 0, part.fragment_id(0));
        let mut linked = TextSpan::from_range(range);
        linked.text = "a".to_string();

        let options = TeiLinearOptions {
            linked_role_ids: vec![COMMENT_ROLE_ID.to_string()],
            ..Default::default()
        };
        let xml = render(vec![linked], options, &context);
        assert_eq!(
            xml,
            format!("<p n=\"1\"><seg ana=\"#[seg/{}]#\">a</seg></p>", part.fragment_id(0))
        );
        assert_eq!(context.id_map.get_id(SEG_MAP_NAME, &part.fragment_id(0)), Some(1));
    }

    #[test]
    fn test_branching_tree_is_rejected() {
        let mut tree = TextTree::new();
        tree.add_child(TextTree::ROOT, 1, None, Some(span("a", false)));
        tree.add_child(TextTree::ROOT, 2, None, Some(span("b", false)));
        let result = TeiLinearTextTreeRenderer::default().render(&tree, &RendererContext::new());
        assert!(matches!(result, Err(ExportError::InvalidArgument(_))));
    }
}
