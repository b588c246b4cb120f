//! Account commands

use tracing::debug;

use super::CommandContext;
use crate::client::VantageApi;
use crate::output::{ContentKind, Printable};
use crate::util::on_not_found;

const NOT_FOUND: &str = "Account not found.";

pub fn get_account(ctx: &CommandContext, client: &dyn VantageApi) -> Printable {
    debug!("get_account: called");
    let classifier = on_not_found(NOT_FOUND);
    ctx.executor.run(|| client.get_account(), ContentKind::Object, Some(&classifier))
}

pub fn update_account(ctx: &CommandContext, client: &dyn VantageApi, new_account_name: &str) -> Printable {
    debug!(%new_account_name, "update_account: called");
    let classifier = on_not_found(NOT_FOUND);
    ctx.executor.run(
        || client.update_account(new_account_name),
        ContentKind::Object,
        Some(&classifier),
    )
}
