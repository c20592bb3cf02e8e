use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}$").expect("Invalid email regex")
});

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    // 邮箱格式校验：必须包含 @ 和 .
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

/// 课程、分组、活动等名称校验
///
/// 名称会拼进复合 id，只要求非空且不过长。
pub fn validate_name(field: &str, value: &str) -> Result<(), String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    if trimmed.chars().count() > 100 {
        return Err(format!("{field} must be at most 100 characters"));
    }
    Ok(())
}

/// 注册时拒绝的常见密码，不区分大小写
const COMMON_PASSWORDS: &[&str] = &[
    "password1",
    "12345678",
    "qwerty123",
    "abcd1234",
    "uninorte1",
    "estudiante1",
    "profesor1",
];

/// 密码策略：至少 8 个字符，包含大小写字母和数字，且不在常见密码表中
///
/// 所有未满足的规则一起返回，用 `; ` 连接。
pub fn validate_password(password: &str) -> Result<(), String> {
    let rules: [(bool, &str); 4] = [
        (
            password.chars().count() >= 8,
            "Password must be at least 8 characters long",
        ),
        (
            password.chars().any(|c| c.is_ascii_uppercase()),
            "Password must contain an uppercase letter",
        ),
        (
            password.chars().any(|c| c.is_ascii_lowercase()),
            "Password must contain a lowercase letter",
        ),
        (
            password.chars().any(|c| c.is_ascii_digit()),
            "Password must contain a digit",
        ),
    ];

    let mut errors: Vec<&str> = rules
        .iter()
        .filter(|(ok, _)| !ok)
        .map(|(_, message)| *message)
        .collect();

    if COMMON_PASSWORDS
        .iter()
        .any(|common| password.eq_ignore_ascii_case(common))
    {
        errors.push("Password is too common");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("; "))
    }
}
