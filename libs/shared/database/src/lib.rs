pub mod appwrite;
