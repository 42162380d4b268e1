use crate::error::Result;
use crate::rebulk::Rebulk;
use crate::rules::properties::surrounded_table;

const EDITIONS: &[(&str, &str)] = &[
    (r"Extended(?:[ ._-]?(?:Cut|Edition|Version))?", "Extended"),
    (r"Director'?s?[ ._-]?(?:Cut|Edition)", "Director's Cut"),
    (r"Unrated", "Unrated"),
    (r"Uncensored", "Uncensored"),
    (r"Remaster(?:ed)?(?:[ ._-]?Edition)?", "Remastered"),
    (r"Collector'?s?(?:[ ._-]?(?:Cut|Edition))?", "Collector"),
    (r"Theatrical(?:[ ._-]?(?:Cut|Edition|Version))?", "Theatrical"),
    (r"Criterion(?:[ ._-]?(?:Collection|Edition))?", "Criterion"),
    (r"Special[ ._-]?Edition", "Special"),
];

pub fn edition() -> Result<Rebulk> {
    Ok(Rebulk::new("edition")
        .disabled(|o| o.is_disabled("edition"))
        .patterns(surrounded_table("edition", EDITIONS)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;
    use crate::rebulk::Engine;
    use crate::types::Value;

    fn values(input: &str) -> Vec<Value> {
        let engine = Engine::new(vec![edition().unwrap()]).unwrap();
        let matches = engine.run(input, &Options::default()).unwrap();
        matches.named("edition").iter().map(|m| m.value.clone()).collect()
    }

    #[test]
    fn editions() {
        assert_eq!(values("Movie.2010.Directors.Cut.1080p"), vec![Value::from("Director's Cut")]);
        assert_eq!(values("Movie.Extended.Edition"), vec![Value::from("Extended")]);
        assert_eq!(
            values("Movie.Remastered.Unrated"),
            vec![Value::from("Remastered"), Value::from("Unrated")]
        );
        assert_eq!(values("Movie.Special.Edition"), vec![Value::from("Special")]);
    }
}
