//! Stock templates shipped with the editor.

use crate::block::{Block, BlockKind, ListFormat};
use crate::service::{ServiceError, Template, TemplateProvider};
use async_trait::async_trait;

pub const DEFAULT_TEMPLATE_ID: &str = "default";

/// In-process catalog of the three stock templates
#[derive(Debug, Clone)]
pub struct BuiltinTemplates {
    templates: Vec<Template>,
}

impl BuiltinTemplates {
    pub fn new() -> Self {
        Self {
            templates: vec![course_plan(), exam(), lesson_plan()],
        }
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn all(&self) -> &[Template] {
        &self.templates
    }

    pub fn by_category(&self, category: &str) -> Vec<&Template> {
        self.templates
            .iter()
            .filter(|t| t.category == category)
            .collect()
    }
}

impl Default for BuiltinTemplates {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TemplateProvider for BuiltinTemplates {
    async fn get_template_by_id(&self, id: &str) -> Result<Template, ServiceError> {
        self.get(id)
            .cloned()
            .ok_or_else(|| ServiceError::template_not_found(id))
    }

    async fn list_templates(&self) -> Result<Vec<Template>, ServiceError> {
        Ok(self.templates.clone())
    }
}

/// Numbers block ids `<prefix>-1`, `<prefix>-2`, ... in insertion order
struct TemplateBuilder {
    prefix: &'static str,
    blocks: Vec<Block>,
}

impl TemplateBuilder {
    fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            blocks: Vec::new(),
        }
    }

    fn push(mut self, kind: BlockKind, content: &str) -> Self {
        let id = format!("{}-{}", self.prefix, self.blocks.len() + 1);
        self.blocks.push(Block::new(id, kind).with_content(content));
        self
    }

    fn heading(self, level: u8, content: &str) -> Self {
        self.push(BlockKind::heading(level), content)
    }

    fn paragraph(self, content: &str) -> Self {
        self.push(BlockKind::Paragraph, content)
    }

    fn bullets(self, items: &[&str]) -> Self {
        let prefix = ListFormat::Unordered.item_prefix();
        let content = items
            .iter()
            .map(|item| format!("{}{}", prefix, item))
            .collect::<Vec<_>>()
            .join("\n");
        self.push(
            BlockKind::List {
                format: ListFormat::Unordered,
            },
            &content,
        )
    }

    fn build(self, title: &str, description: &str, category: &str) -> Template {
        Template {
            id: self.prefix.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            blocks: self.blocks,
        }
    }
}

fn course_plan() -> Template {
    TemplateBuilder::new(DEFAULT_TEMPLATE_ID)
        .heading(1, "Course plan")
        .heading(2, "Introduction")
        .paragraph("Present your course and its general context here...")
        .heading(2, "Learning objectives")
        .bullets(&[
            "Objective 1: Understand the fundamental concepts",
            "Objective 2: Apply the acquired knowledge",
            "Objective 3: Analyse and evaluate complex situations",
        ])
        .heading(2, "Chapter 1: Fundamentals")
        .paragraph("Content of the first chapter...")
        .heading(2, "Chapter 2: Practical applications")
        .paragraph("Content of the second chapter...")
        .heading(2, "Assessment")
        .paragraph("Describe the assessment methods here...")
        .build(
            "Standard course plan",
            "A course plan with introduction, objectives and chapters",
            "General",
        )
}

fn exam() -> Template {
    TemplateBuilder::new("exam")
        .heading(1, "[Subject] exam")
        .paragraph("Duration: [Duration] - Points: [Total points]")
        .heading(2, "Instructions")
        .paragraph("Answer every question. Permitted documents are...")
        .heading(2, "Part I: Multiple-choice questions (10 points)")
        .paragraph("For each question, select the correct answer.")
        .heading(2, "Part II: Short answer questions (20 points)")
        .paragraph("Answer the following questions in 2-3 sentences.")
        .heading(2, "Part III: Problems (30 points)")
        .paragraph("Solve the following problems, showing every step of your reasoning.")
        .build(
            "Exam template",
            "An exam with several sections and question types",
            "Assessment",
        )
}

fn lesson_plan() -> Template {
    TemplateBuilder::new("lesson")
        .heading(1, "Lesson: [Lesson title]")
        .heading(2, "General information")
        .paragraph("Level: [Level]\nDuration: [Duration]\nPrerequisites: [Required prior knowledge]")
        .heading(2, "Learning objectives")
        .bullets(&[
            "Students will be able to...",
            "Students will understand...",
            "Students will be able to apply...",
        ])
        .heading(2, "Required material")
        .bullets(&["Textbooks", "Worksheets", "Specific equipment"])
        .heading(2, "Lesson outline")
        .heading(3, "1. Introduction (10 min)")
        .paragraph("Description of the introduction activity...")
        .heading(3, "2. Development (30 min)")
        .paragraph("Description of the main activities...")
        .heading(3, "3. Conclusion (10 min)")
        .paragraph("Description of the closing activity...")
        .heading(2, "Assessment")
        .paragraph("Description of the assessment methods for this lesson...")
        .build(
            "Detailed lesson plan",
            "A lesson with objectives, activities and assessment",
            "Teaching",
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockType;
    use crate::store::BlockStore;

    #[test]
    fn test_three_stock_templates() {
        let catalog = BuiltinTemplates::new();
        let ids: Vec<&str> = catalog.all().iter().map(|t| t.id.as_str()).collect();

        assert_eq!(ids, vec!["default", "exam", "lesson"]);
        assert_eq!(catalog.get("exam").unwrap().blocks.len(), 10);
        assert_eq!(catalog.get("lesson").unwrap().blocks.len(), 16);
    }

    #[test]
    fn test_template_block_ids_unique() {
        for template in BuiltinTemplates::new().all() {
            let store = BlockStore::from_blocks(template.blocks.clone());
            assert!(store.duplicate_ids().is_empty(), "{}", template.id);
            assert_eq!(template.blocks[0].heading_level(), Some(1));
        }
    }

    #[test]
    fn test_bullets_use_list_prefix() {
        let catalog = BuiltinTemplates::new();
        let list = catalog
            .get(DEFAULT_TEMPLATE_ID)
            .unwrap()
            .blocks
            .iter()
            .find(|b| b.block_type() == BlockType::List)
            .unwrap();

        assert_eq!(list.content.lines().count(), 3);
        assert!(list.content.lines().all(|l| l.starts_with("• ")));
    }

    #[test]
    fn test_by_category() {
        let catalog = BuiltinTemplates::new();
        assert_eq!(catalog.by_category("Assessment").len(), 1);
        assert!(catalog.by_category("Unknown").is_empty());
    }

    #[tokio::test]
    async fn test_provider_not_found() {
        let catalog = BuiltinTemplates::new();

        assert!(catalog.get_template_by_id("lesson").await.is_ok());
        assert_eq!(
            catalog.get_template_by_id("missing").await,
            Err(ServiceError::template_not_found("missing"))
        );
    }
}
