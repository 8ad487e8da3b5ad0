use salonbook_access::lookup::static_lookup::StaticLookup;
use salonbook_access::{ResolveOptions, UserId, UserStateResolver};

use super::print_result;
use crate::OutputFormat;

pub(crate) struct ClassifyArgs<'a> {
    pub user: Option<&'a str>,
    pub admin: bool,
    pub user_type: Option<&'a str>,
    pub businesses: u32,
}

/// Classify from command-line facts, through the same lookup sequence a
/// live backend goes through.
pub(crate) fn cmd_classify(args: ClassifyArgs<'_>, output: OutputFormat, quiet: bool) {
    let mut lookup = StaticLookup::new();
    if let Some(id) = args.user {
        if args.admin {
            lookup = lookup.with_admin(id);
        }
        if let Some(role) = args.user_type {
            lookup = lookup.with_profile(id, role);
        }
        lookup = lookup.with_businesses(id, args.businesses);
    }

    let resolver = UserStateResolver::new(lookup);
    let user_id = args.user.map(UserId::new);

    let rt = crate::runtime(output, quiet);
    let result = rt.block_on(resolver.get_user_state(user_id.as_ref(), ResolveOptions::default()));
    print_result(&result, None, output, quiet);
}
