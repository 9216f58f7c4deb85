//! Contracts and other flowed-text documents built from a template body.

use serde::{Deserialize, Serialize};

use super::assembler::AssemblyContext;
use super::binder::{display_value, lookup_path, DataBag};
use super::common::format_timestamp;
use super::plan::{
    Block, DocumentKind, DocumentPlan, PageSetup, SignatureBox, StyleRole, StyledLine,
};
use super::traits::{Assemble, Validator};
use super::validation::{validate_required_opt, ValidationErrors};

/// Request body for the built-in contract templates.
///
/// Everything besides `template` is the data bag, e.g. `partyA.name` arrives
/// as `{"partyA": {"name": ...}}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContractRequest {
    #[serde(default)]
    pub template: Option<String>,
    #[serde(flatten)]
    pub data: DataBag,
}

impl ContractRequest {
    fn text_at(&self, path: &str) -> Option<String> {
        lookup_path(&self.data, path).and_then(display_value)
    }
}

impl Validator for ContractRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        validate_required_opt(
            self.template.as_deref(),
            "template",
            "Mẫu hợp đồng",
            &mut errors,
        );
        validate_required_opt(
            self.text_at("partyA.name").as_deref(),
            "partyA.name",
            "Tên bên A",
            &mut errors,
        );
        validate_required_opt(
            self.text_at("partyB.name").as_deref(),
            "partyB.name",
            "Tên bên B",
            &mut errors,
        );

        errors.into_result()
    }
}

/// A bound template body ready for layout.
#[derive(Debug, Clone)]
pub struct FlowedDocument {
    pub kind: DocumentKind,
    pub title: String,
    /// The substituted body; unresolved tokens are still in it.
    pub body: String,
    /// Representatives for the two-party signature block, when the document
    /// has one.
    pub signatories: Option<(Option<String>, Option<String>)>,
}

impl FlowedDocument {
    /// Contract between `partyA` and `partyB` of `data`.
    pub fn contract(title: impl Into<String>, body: String, data: &DataBag) -> Self {
        let rep = |path: &str| lookup_path(data, path).and_then(display_value);
        Self {
            kind: DocumentKind::Contract,
            title: title.into(),
            body,
            signatories: Some((rep("partyA.representative"), rep("partyB.representative"))),
        }
    }

    /// Uploaded template without a known signature layout.
    pub fn plain(title: impl Into<String>, body: String) -> Self {
        Self {
            kind: DocumentKind::Contract,
            title: title.into(),
            body,
            signatories: None,
        }
    }
}

impl Assemble for FlowedDocument {
    fn assemble(&self, ctx: &AssemblyContext) -> DocumentPlan {
        let mut plan = DocumentPlan::new(
            self.kind,
            self.title.clone(),
            PageSetup::a4([60.0, 60.0, 60.0, 60.0]),
        );

        plan.push(Block::Paragraph(StyledLine::new(
            self.body.trim_matches('\n').to_string(),
            StyleRole::Body,
        )));

        if let Some((party_a, party_b)) = &self.signatories {
            plan.push(Block::Signatures(vec![
                SignatureBox {
                    heading: "ĐẠI DIỆN BÊN A".to_string(),
                    note: "(Ký, ghi rõ họ tên)".to_string(),
                    name: party_a.clone(),
                },
                SignatureBox {
                    heading: "ĐẠI DIỆN BÊN B".to_string(),
                    note: "(Ký, ghi rõ họ tên)".to_string(),
                    name: party_b.clone(),
                },
            ]));
        }

        plan.push(Block::Footer(format!(
            "Tạo lúc: {}",
            format_timestamp(&ctx.generated_at)
        )));

        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flattened_data_bag() {
        let req: ContractRequest = serde_json::from_value(json!({
            "template": "mua_ban",
            "partyA": { "name": "Công ty A" },
            "partyB": { "name": "Công ty B" },
            "contractValue": 1000
        }))
        .unwrap();

        assert_eq!(req.template.as_deref(), Some("mua_ban"));
        assert!(req.data.contains_key("contractValue"));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_missing_parties() {
        let req: ContractRequest =
            serde_json::from_value(json!({ "partyA": { "name": " " } })).unwrap();
        let err = req.validate().unwrap_err();
        assert_eq!(err.fields(), vec!["template", "partyA.name", "partyB.name"]);
    }

    #[test]
    fn test_layout_is_body_signatures_footer() {
        let data = json!({ "partyA": { "representative": "Ông A" } })
            .as_object()
            .cloned()
            .unwrap();
        let doc = FlowedDocument::contract("HỢP ĐỒNG", "\nNội dung\n".to_string(), &data);
        let plan = doc.assemble(&AssemblyContext::now(10.0));

        assert_eq!(plan.blocks.len(), 3);
        assert!(matches!(
            &plan.blocks[0],
            Block::Paragraph(line) if line.text == "Nội dung" && line.role == StyleRole::Body
        ));
        let Block::Signatures(boxes) = &plan.blocks[1] else {
            panic!("expected signatures");
        };
        assert_eq!(boxes[0].name.as_deref(), Some("Ông A"));
        assert_eq!(boxes[1].name, None);
        assert!(matches!(&plan.blocks[2], Block::Footer(f) if f.starts_with("Tạo lúc: ")));
    }

    #[test]
    fn test_plain_document_has_no_signatures() {
        let plan = FlowedDocument::plain("Mẫu", "Xin chào [NAME]".to_string())
            .assemble(&AssemblyContext::now(10.0));
        assert_eq!(plan.blocks.len(), 2);
    }
}
