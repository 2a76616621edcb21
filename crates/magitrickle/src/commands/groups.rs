//! Group command handlers.

use tabled::Tabled;

use magitrickle_api::{DaemonClient, Group, GroupRequest};

use crate::cli::{GroupArgs, GroupCommand, OutputFormat};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::rules;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Interface")]
    interface: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Color")]
    color: String,
    #[tabled(rename = "Rules")]
    rules: String,
}

impl GroupRow {
    fn new(g: &Group, color: bool) -> Self {
        Self {
            id: g.id.clone(),
            name: g.name.clone(),
            interface: g.interface.clone(),
            enabled: output::enabled_cell(g.enable, color),
            color: g.color.clone(),
            rules: g.rules.as_ref().map(|r| r.len().to_string()).unwrap_or_default(),
        }
    }
}

fn group_detail(g: &Group, color: bool) -> String {
    output::detail_block(&[
        ("ID", g.id.clone()),
        ("Name", output::heading(&g.name, color)),
        ("Interface", g.interface.clone()),
        ("Enabled", output::enabled_cell(g.enable, color)),
        ("Color", g.color.clone()),
    ])
}

/// Each group's detail block followed by its rules.
fn nested_detail(groups: &[Group], color: bool) -> String {
    groups
        .iter()
        .map(|g| {
            let rules = g.rules.as_deref().unwrap_or_default();
            let body = if rules.is_empty() {
                "Rules:     (none)".to_owned()
            } else {
                format!("Rules:\n{}", rules::rules_table(rules, color))
            };
            format!("{}\n{body}", group_detail(g, color))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(client: &DaemonClient, args: GroupArgs, ctx: &Context) -> Result<(), CliError> {
    match args.command {
        GroupCommand::List { with_rules } => {
            let groups = client.list_groups(with_rules).await?;
            let out = if with_rules && ctx.output == OutputFormat::Table && !groups.is_empty() {
                nested_detail(&groups, ctx.color)
            } else {
                output::render_list(
                    ctx.output,
                    &groups,
                    "No groups found.",
                    |g| GroupRow::new(g, ctx.color),
                    |g| g.id.clone(),
                )?
            };
            output::print_output(&out, ctx.quiet);
            Ok(())
        }

        GroupCommand::Create {
            name,
            interface,
            enable,
            color,
            save,
        } => {
            let req = GroupRequest {
                name,
                interface,
                enable,
                color,
            };
            let group = client.create_group(&req, save).await?;
            output::print_status("Group created successfully", ctx.quiet);
            print_group(&group, ctx)
        }

        GroupCommand::Update {
            group_id,
            name,
            interface,
            enable,
            color,
            save,
        } => {
            let req = GroupRequest {
                name,
                interface,
                enable,
                color,
            };
            let group = client.update_group(&group_id, &req, save).await?;
            output::print_status("Group updated successfully", ctx.quiet);
            print_group(&group, ctx)
        }

        GroupCommand::Delete { group_id, save } => {
            client.delete_group(&group_id, save).await?;
            output::print_status("Group deleted successfully", ctx.quiet);
            Ok(())
        }
    }
}

fn print_group(group: &Group, ctx: &Context) -> Result<(), CliError> {
    let out = output::render_single(
        ctx.output,
        group,
        |g| group_detail(g, ctx.color),
        |g| g.id.clone(),
    )?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use magitrickle_api::Rule;

    use super::*;

    fn group(rules: Option<Vec<Rule>>) -> Group {
        Group {
            id: "g1".into(),
            name: "Video".into(),
            interface: "br0".into(),
            enable: true,
            color: "#ff0000".into(),
            rules,
        }
    }

    #[test]
    fn detail_lists_every_field() {
        let out = group_detail(&group(None), false);
        for needle in ["g1", "Video", "br0", "yes", "#ff0000"] {
            assert!(out.contains(needle), "missing {needle} in:\n{out}");
        }
    }

    #[test]
    fn nested_view_shows_rules_under_group() {
        let rule = Rule {
            id: "r1".into(),
            name: "yt".into(),
            rule_type: "domain".into(),
            rule: "youtube.com".into(),
            enable: false,
        };
        let out = nested_detail(&[group(Some(vec![rule])), group(Some(vec![]))], false);
        let group_pos = out.find("Video").expect("group");
        let rule_pos = out.find("youtube.com").expect("rule");
        assert!(group_pos < rule_pos);
        assert!(out.contains("(none)"));
    }
}
