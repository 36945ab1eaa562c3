mod fields;
mod footer;
mod tabstrip;

pub(crate) use fields::render_fields;
pub(crate) use footer::render_footer;
pub(crate) use tabstrip::render_tab_strip;
