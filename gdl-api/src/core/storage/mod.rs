pub mod arc_str;
