use cv_chat_kit::TranslationTable;

mod de;
mod en;

/// Every string shown by the widget, in both supported languages.
pub static TRANSLATIONS: TranslationTable = TranslationTable {
    de: de::STRINGS,
    en: en::STRINGS,
};
