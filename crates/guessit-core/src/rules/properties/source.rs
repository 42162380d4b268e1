use crate::error::Result;
use crate::rebulk::Rebulk;
use crate::rules::properties::surrounded_table;

const SOURCES: &[(&str, &str)] = &[
    (r"VHS(?:-?Rip)?", "VHS"),
    (r"CAM(?:-?Rip)?", "Camera"),
    (r"HD-?CAM(?:-?Rip)?", "HD Camera"),
    (r"TS|TELESYNC|PDVD", "Telesync"),
    (r"HD-?TS|HD-?TELESYNC", "HD Telesync"),
    (r"WORKPRINT|WP", "Workprint"),
    (r"TC|TELECINE", "Telecine"),
    (r"HD-?TC|HD-?TELECINE", "HD Telecine"),
    (r"PPV(?:-?Rip)?", "Pay-per-view"),
    (r"(?:SD-?)?TV(?:-?Rip)?|Rip-?(?:SD-?)?TV", "TV"),
    (r"DVB(?:-?Rip)?|DTV(?:-?Rip)?|PD-?TV(?:-?Rip)?", "Digital TV"),
    (r"SAT(?:-?Rip)?|DSR(?:-?Rip)?|DTH(?:-?Rip)?", "Satellite"),
    (r"HD-?TV(?:-?Rip)?|TV-?Rip-?HD", "HDTV"),
    (r"DVD(?:-?Rip)?|DVD-?[59]|DVD-?R|VIDEO-?TS|DVD-?Mux", "DVD"),
    (r"HD-?DVD(?:-?Rip)?", "HD-DVD"),
    (
        r"(?:UHD|Ultra-?HD|4K)[ ._-]?(?:Blu-?ray|BD)(?:-?Rip)?",
        "Ultra HD Blu-ray",
    ),
    (
        r"Blu-?ray(?:-?Rip)?|BD(?:-?Rip)?|BR-?Rip|BD[59]|BD25|BD50|BR-?Disk",
        "Blu-ray",
    ),
    (r"WEB(?:-?DL|-?Rip|-?Cap|-?HD|-?UHD)?|WEB-?DLRip|DL-?WEB", "Web"),
];

pub fn source() -> Result<Rebulk> {
    Ok(Rebulk::new("source")
        .disabled(|o| o.is_disabled("source"))
        .patterns(surrounded_table("source", SOURCES)?))
}
