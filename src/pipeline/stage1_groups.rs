use anyhow::Result;
use tracing::info;

use crate::ctx::Ctx;
use crate::groups::GroupAssignment;
use crate::io::annotation::AnnotationTable;
use crate::pipeline::Stage;
use crate::schema::v1::GroupMeta;

pub struct Stage1Groups;

impl Stage1Groups {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage1Groups {
    fn name(&self) -> &'static str {
        "stage1_groups"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        if let Some(path) = &ctx.groups_path {
            let groups = GroupAssignment::load(path)?;
            info!(
                samples = groups.samples().len(),
                groups = %groups.groups().join(" -> "),
                "groups_loaded"
            );
            ctx.report.groups = Some(GroupMeta {
                order: groups.groups().to_vec(),
                samples: groups.samples().len(),
                control: None,
                experimental: None,
            });
            ctx.groups = Some(groups);
        }

        if let Some(path) = &ctx.annotation_path {
            let annotations = AnnotationTable::load(path)?;
            info!(events = annotations.len(), "annotations_loaded");
            ctx.annotations = Some(annotations);
        }

        Ok(())
    }
}
