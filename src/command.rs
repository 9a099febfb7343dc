use crate::view_model::SortOrder;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Search(String),
    ClearSearch,
    Sort(SortOrder),
    Page(usize),
    PageSize(usize),
    Open(u64),
    Close,
    Like(u64),
    Reload,
    Help,
    Quit,
}

pub fn parse_command(input: &str) -> Option<Command> {
    let input = input.strip_prefix(':').unwrap_or(input).trim();

    if input.is_empty() {
        return None;
    }

    let (cmd, args) = match input.split_once(char::is_whitespace) {
        Some((cmd, args)) => (cmd, args.trim()),
        None => (input, ""),
    };

    match cmd {
        "search" | "s" if !args.is_empty() => Some(Command::Search(args.to_owned())),
        "clear" => Some(Command::ClearSearch),
        "sort" => args.parse().ok().map(Command::Sort),
        "page" | "p" => parse_positive(args).map(Command::Page),
        "size" => parse_positive(args).map(Command::PageSize),
        "open" | "o" => parse_post_id(args).map(Command::Open),
        "close" => Some(Command::Close),
        "like" => parse_post_id(args).map(Command::Like),
        "reload" | "r" => Some(Command::Reload),
        "help" | "h" => Some(Command::Help),
        "quit" | "q" => Some(Command::Quit),
        _ => None,
    }
}

fn parse_positive(args: &str) -> Option<usize> {
    args.parse::<usize>().ok().filter(|n| *n > 0)
}

/// Accepts a bare id or `#id`.
pub fn parse_post_id(input: &str) -> Option<u64> {
    let trimmed = input.trim();
    trimmed.strip_prefix('#').unwrap_or(trimmed).parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_search() {
        assert_eq!(
            parse_command(":search qui est"),
            Some(Command::Search("qui est".into()))
        );
        assert_eq!(parse_command("search"), None);
        assert_eq!(parse_command(":clear"), Some(Command::ClearSearch));
    }

    #[test]
    fn test_parse_command_sort() {
        assert_eq!(
            parse_command(":sort desc"),
            Some(Command::Sort(SortOrder::Descending))
        );
        assert_eq!(
            parse_command(":sort ascending"),
            Some(Command::Sort(SortOrder::Ascending))
        );
        assert_eq!(parse_command(":sort up"), None);
    }

    #[test]
    fn test_parse_command_paging() {
        assert_eq!(parse_command(":page 3"), Some(Command::Page(3)));
        assert_eq!(parse_command(":size 20"), Some(Command::PageSize(20)));
        assert_eq!(parse_command(":page 0"), None);
        assert_eq!(parse_command(":size -1"), None);
    }

    #[test]
    fn test_parse_command_detail() {
        assert_eq!(parse_command(":open #42"), Some(Command::Open(42)));
        assert_eq!(parse_command(":o 7"), Some(Command::Open(7)));
        assert_eq!(parse_command(":like 7"), Some(Command::Like(7)));
        assert_eq!(parse_command(":close"), Some(Command::Close));
        assert_eq!(parse_command(":open abc"), None);
    }

    #[test]
    fn test_parse_command_aliases() {
        assert_eq!(parse_command(":q"), Some(Command::Quit));
        assert_eq!(parse_command(":h"), Some(Command::Help));
        assert_eq!(parse_command(":r"), Some(Command::Reload));
    }

    #[test]
    fn test_parse_command_empty() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command(":"), None);
    }
}
