//! Localized response messages.

use gatehouse_core::Locale;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Message {
    Done,
    Saved,
    Updated,
    Deleted,
    Authorized,
    NoData,
    MissingData,
    InvalidData,

    CheckName,
    CheckMobile,
    CheckEmail,
    CheckPassword,
    CheckLanguage,
    CheckUsername,
    CheckLoginData,
    CheckAreaName,
    CheckLabels,
    CheckActionName,

    UserNotFound,
    AccountExists,
    AreaExists,
    ActionExists,

    AuthorizationProblem,
    BrowserProblem,
    RouteNotAllowed,
    PermissionNotAllowed,
}

impl Message {
    pub const ALL: [Message; 26] = [
        Message::Done,
        Message::Saved,
        Message::Updated,
        Message::Deleted,
        Message::Authorized,
        Message::NoData,
        Message::MissingData,
        Message::InvalidData,
        Message::CheckName,
        Message::CheckMobile,
        Message::CheckEmail,
        Message::CheckPassword,
        Message::CheckLanguage,
        Message::CheckUsername,
        Message::CheckLoginData,
        Message::CheckAreaName,
        Message::CheckLabels,
        Message::CheckActionName,
        Message::UserNotFound,
        Message::AccountExists,
        Message::AreaExists,
        Message::ActionExists,
        Message::AuthorizationProblem,
        Message::BrowserProblem,
        Message::RouteNotAllowed,
        Message::PermissionNotAllowed,
    ];

    pub fn text(self, locale: Locale) -> &'static str {
        let (en, ar) = self.texts();
        match locale {
            Locale::En => en,
            Locale::Ar => ar,
        }
    }

    fn texts(self) -> (&'static str, &'static str) {
        match self {
            Message::Done => ("Done", "تم"),
            Message::Saved => ("Saved", "تم الحفظ"),
            Message::Updated => ("Updated", "تم التعديل"),
            Message::Deleted => ("Deleted", "تم الحذف"),
            Message::Authorized => ("You are authorized", "تم تسجيل الدخول"),
            Message::NoData => ("No Data", "لاتوجد بيانات"),
            Message::MissingData => ("Missing Data", "بيانات ناقصة"),
            Message::InvalidData => ("Invalid Data !! Please Check Data", "يرجي التأكد من البيانات"),

            Message::CheckName => ("Please Check Name", "يرجي التأكد من الإسم"),
            Message::CheckMobile => ("Please Check Mobile", "يرجي التأكد من المحمول"),
            Message::CheckEmail => ("Please Check Email", "يرجي التأكد من الإيميل"),
            Message::CheckPassword => ("Please Check Password", "يرجي التأكد من كلمة المرور"),
            Message::CheckLanguage => ("Please Check Language", "يرجي التأكد من اللغة"),
            Message::CheckUsername => ("Please Check Username", "يرجي التأكد من إسم المستخدم"),
            Message::CheckLoginData => ("Please Check Login Data", "يرجي التأكد من بيانات الدخول"),
            Message::CheckAreaName => ("Please Check Route Name", "يرجي التأكد من العنوان"),
            Message::CheckLabels => ("Please Check Labels", "يرجي التأكد من المسميات"),
            Message::CheckActionName => ("Please Check Permission Name", "يرجي التأكد من إسم الصلاحية"),

            Message::UserNotFound => ("User Not Found", "المستخدم غير موجود"),
            Message::AccountExists => ("User Exists", "المستخدم مسجل"),
            Message::AreaExists => ("Route Exists", "العنوان مسجل"),
            Message::ActionExists => ("Permission Exists", "الصلاحية مسجلة"),

            Message::AuthorizationProblem => (
                "There Is Problem In Authorization Please Relogin",
                "توجد مشكلة في المصادقة يرجي إعادة تسجيل الدخول",
            ),
            Message::BrowserProblem => (
                "There Is Problem In Browser Please Relogin",
                "توجد مشكلة في المتصفح يرجي إعادة تسجيل الدخول",
            ),
            Message::RouteNotAllowed => (
                "Sorry You Don't Have Permission To Access This Page",
                "عفوا ليس لدية صلاحية الدخول لهذه الصفحة",
            ),
            Message::PermissionNotAllowed => ("Sorry You Don't Have Permission", "عفوا ليس لدية صلاحية"),
        }
    }

    /// Message for a field named by `DomainError::Validation`.
    pub fn for_field(field: &str) -> Message {
        match field {
            "name" => Message::CheckName,
            "mobile" => Message::CheckMobile,
            "email" => Message::CheckEmail,
            "password" => Message::CheckPassword,
            "language" => Message::CheckLanguage,
            "username" => Message::CheckUsername,
            "areaName" => Message::CheckAreaName,
            "labels" => Message::CheckLabels,
            "actionName" => Message::CheckActionName,
            _ => Message::InvalidData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_message_has_both_languages() {
        for message in Message::ALL {
            assert!(!message.text(Locale::En).is_empty(), "{message:?}");
            assert!(!message.text(Locale::Ar).is_empty(), "{message:?}");
            assert_ne!(message.text(Locale::En), message.text(Locale::Ar), "{message:?}");
        }
    }

    #[test]
    fn validation_fields_have_specific_messages() {
        assert_eq!(Message::for_field("mobile"), Message::CheckMobile);
        assert_eq!(Message::for_field("areaName"), Message::CheckAreaName);
        assert_eq!(Message::for_field("somethingElse"), Message::InvalidData);
    }
}
