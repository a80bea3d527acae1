use crate::tree_walk_interpreter::{
    NativeContext, NativeError, NativeFunctionException, RuntimeValue,
};

use super::INDEX_OUT_OF_BOUNDS_EXCEPTION;

type Out = Result<RuntimeValue, NativeError>;

// Lengths and indices count characters, not bytes.

pub fn length(ctx: &mut NativeContext) -> Out {
    Ok((ctx.string("string")?.chars().count() as f64).into())
}

/// Characters `start..=end`.
pub fn substring(ctx: &mut NativeContext) -> Out {
    let string = ctx.string("string")?;
    let chars: Vec<char> = string.chars().collect();
    let start = index(ctx.number("start")?);
    let end = index(ctx.number("end")?);
    if start < 0 || end >= chars.len() as i64 || start > end + 1 {
        return Err(out_of_bounds());
    }
    Ok(chars[start as usize..(end + 1) as usize]
        .iter()
        .collect::<String>()
        .into())
}

/// Characters from `start` to the end of the string.
pub fn substring_to_end(ctx: &mut NativeContext) -> Out {
    let string = ctx.string("string")?;
    let start = index(ctx.number("start")?);
    if start < 0 || start > string.chars().count() as i64 {
        return Err(out_of_bounds());
    }
    Ok(string.chars().skip(start as usize).collect::<String>().into())
}

pub fn replace(ctx: &mut NativeContext) -> Out {
    let string = ctx.string("string")?;
    let target = ctx.string("target")?;
    let replacement = ctx.string("replacement")?;
    Ok(string.replace(target.as_str(), &replacement).into())
}

pub fn trim(ctx: &mut NativeContext) -> Out {
    Ok(ctx.string("string")?.trim().into())
}

pub fn contains(ctx: &mut NativeContext) -> Out {
    let string = ctx.string("string")?;
    let search = ctx.string("search")?;
    Ok(string.contains(search.as_str()).into())
}

pub fn starts_with(ctx: &mut NativeContext) -> Out {
    let string = ctx.string("string")?;
    let prefix = ctx.string("prefix")?;
    Ok(string.starts_with(prefix.as_str()).into())
}

pub fn ends_with(ctx: &mut NativeContext) -> Out {
    let string = ctx.string("string")?;
    let suffix = ctx.string("suffix")?;
    Ok(string.ends_with(suffix.as_str()).into())
}

/// Fractional indices truncate toward zero.
fn index(value: f64) -> i64 {
    value.trunc() as i64
}

fn out_of_bounds() -> NativeError {
    NativeFunctionException::new(INDEX_OUT_OF_BOUNDS_EXCEPTION, "Index out of bounds").into()
}

#[cfg(test)]
mod tests {
    use super::super::tests::call;
    use crate::tree_walk_interpreter::RuntimeValue;
    use pretty_assertions::assert_eq;

    fn out_of_bounds() -> Result<RuntimeValue, (String, String)> {
        Err((
            "INDEX_OUT_OF_BOUNDS_EXCEPTION".to_string(),
            "Index out of bounds".to_string(),
        ))
    }

    #[test]
    fn substring_end_is_inclusive() {
        assert_eq!(
            call("str_substr", &["hello".into(), 1.0.into(), 3.0.into()]),
            Ok("ell".into())
        );
        assert_eq!(
            call("str_substr", &["hello".into(), 0.0.into(), 4.0.into()]),
            Ok("hello".into())
        );
        assert_eq!(
            call("str_substr", &["hello".into(), 2.0.into(), 1.0.into()]),
            Ok("".into())
        );
    }

    #[test]
    fn substring_bounds() {
        assert_eq!(
            call("str_substr", &["ab".into(), 5.0.into(), 6.0.into()]),
            out_of_bounds()
        );
        assert_eq!(
            call("str_substr", &["ab".into(), (-1.0).into(), 1.0.into()]),
            out_of_bounds()
        );
        assert_eq!(
            call("str_substr", &["ab".into(), 0.0.into(), 2.0.into()]),
            out_of_bounds()
        );
        assert_eq!(
            call("str_substr", &["hello".into(), 2.0.into()]),
            Ok("llo".into())
        );
        assert_eq!(
            call("str_substr", &["hello".into(), 5.0.into()]),
            Ok("".into())
        );
        assert_eq!(
            call("str_substr", &["hello".into(), 6.0.into()]),
            out_of_bounds()
        );
    }

    #[test]
    fn counts_characters() {
        assert_eq!(call("str_length", &["héllo".into()]), Ok(5.0.into()));
        assert_eq!(
            call("str_substr", &["héllo".into(), 1.0.into(), 1.0.into()]),
            Ok("é".into())
        );
    }

    #[test]
    fn searching_and_editing() {
        assert_eq!(
            call("str_replace", &["a-b-c".into(), "-".into(), "+".into()]),
            Ok("a+b+c".into())
        );
        assert_eq!(call("str_trim", &["  x \n".into()]), Ok("x".into()));
        assert_eq!(
            call("str_contains", &["haystack".into(), "st".into()]),
            Ok(true.into())
        );
        assert_eq!(
            call("str_startswith", &["haystack".into(), "hay".into()]),
            Ok(true.into())
        );
        assert_eq!(
            call("str_endswith", &["haystack".into(), "hay".into()]),
            Ok(false.into())
        );
    }
}
