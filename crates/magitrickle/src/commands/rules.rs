//! Rule command handlers.

use tabled::Tabled;

use magitrickle_api::{DaemonClient, Rule, RuleRequest};

use crate::cli::{RuleArgs, RuleCommand};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    rule_type: String,
    #[tabled(rename = "Rule")]
    rule: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
}

impl RuleRow {
    fn new(r: &Rule, color: bool) -> Self {
        Self {
            id: r.id.clone(),
            name: r.name.clone(),
            rule_type: r.rule_type.clone(),
            rule: r.rule.clone(),
            enabled: output::enabled_cell(r.enable, color),
        }
    }
}

pub(crate) fn rules_table(rules: &[Rule], color: bool) -> String {
    let rows: Vec<RuleRow> = rules.iter().map(|r| RuleRow::new(r, color)).collect();
    output::render_table(&rows)
}

fn rule_detail(r: &Rule, color: bool) -> String {
    output::detail_block(&[
        ("ID", r.id.clone()),
        ("Name", output::heading(&r.name, color)),
        ("Type", r.rule_type.clone()),
        ("Rule", r.rule.clone()),
        ("Enabled", output::enabled_cell(r.enable, color)),
    ])
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(client: &DaemonClient, args: RuleArgs, ctx: &Context) -> Result<(), CliError> {
    match args.command {
        RuleCommand::List { group_id } => {
            let rules = client.list_rules(&group_id).await?;
            print_rules(&rules, ctx)
        }

        RuleCommand::Replace {
            group_id,
            file,
            save,
        } => {
            let requested = util::read_rule_set(&file)?;
            tracing::debug!(count = requested.len(), path = %file.display(), "replacing rule set");
            let rules = client.replace_rules(&group_id, &requested, save).await?;
            output::print_status("Rules replaced successfully", ctx.quiet);
            print_rules(&rules, ctx)
        }

        RuleCommand::Create {
            group_id,
            name,
            rule_type,
            rule,
            enable,
            save,
        } => {
            let req = RuleRequest {
                name,
                rule_type,
                rule,
                enable,
            };
            let rule = client.create_rule(&group_id, &req, save).await?;
            output::print_status("Rule created successfully", ctx.quiet);
            print_rule(&rule, ctx)
        }

        RuleCommand::Get { group_id, rule_id } => {
            let rule = client.get_rule(&group_id, &rule_id).await?;
            print_rule(&rule, ctx)
        }

        RuleCommand::Update {
            group_id,
            rule_id,
            name,
            rule_type,
            rule,
            enable,
            save,
        } => {
            let req = RuleRequest {
                name,
                rule_type,
                rule,
                enable,
            };
            let rule = client.update_rule(&group_id, &rule_id, &req, save).await?;
            output::print_status("Rule updated successfully", ctx.quiet);
            print_rule(&rule, ctx)
        }

        RuleCommand::Delete {
            group_id,
            rule_id,
            save,
        } => {
            client.delete_rule(&group_id, &rule_id, save).await?;
            output::print_status("Rule deleted successfully", ctx.quiet);
            Ok(())
        }
    }
}

fn print_rules(rules: &[Rule], ctx: &Context) -> Result<(), CliError> {
    let out = output::render_list(
        ctx.output,
        rules,
        "No rules found for this group.",
        |r| RuleRow::new(r, ctx.color),
        |r| r.id.clone(),
    )?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

fn print_rule(rule: &Rule, ctx: &Context) -> Result<(), CliError> {
    let out = output::render_single(ctx.output, rule, |r| rule_detail(r, ctx.color), |r| r.id.clone())?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}
